//! Verify command - the full greedy linking check.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::engine::Bitbake;
use crate::error::Error;
use crate::history::GitHistory;
use crate::pipeline::{self, Plan};
use crate::preflight;
use crate::settings::BuildSettings;
use crate::verify::VerificationReport;

/// Options of the verify command beyond the plan itself.
pub struct VerifyOptions {
    pub plan: Plan,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Remove the output directory before starting.
    pub wipe: bool,
    /// Write the report as JSON here.
    pub report: Option<PathBuf>,
}

/// Execute the verify command.
pub fn cmd_verify(config: &Config, options: VerifyOptions) -> Result<()> {
    let output_dir = config.output_dir_or(options.output.as_deref());
    let plan = &options.plan;

    if options.wipe && output_dir.exists() {
        println!("Removing {}...", output_dir.display());
        fs::remove_dir_all(&output_dir)
            .with_context(|| format!("Failed to remove {}", output_dir.display()))?;
    }

    preflight::run_preflight_or_fail(config, &output_dir)?;

    let settings = BuildSettings::new(&output_dir);
    let engine = Bitbake::new(&config.bitbake, &config.build_dir).with_postread(settings.path());
    let history = GitHistory::new(&config.git, settings.history_dir());

    println!("=== Greedy linking check: {} ===\n", plan.target);
    let start = Instant::now();

    let report = pipeline::run(&engine, &history, &settings, plan)?;

    println!();
    report.print();

    if let Some(path) = &options.report {
        write_report(&report, path)?;
        println!("Report written to {}", path.display());
    }

    let elapsed = start.elapsed().as_secs_f64() / 60.0;
    if !report.all_passed() {
        for (recipe, diff) in report.failures() {
            eprintln!("\n=== {} ===\n{}", recipe, diff.trim_end());
        }
        return Err(Error::DefectsFound {
            count: report.fail_count(),
        }
        .into());
    }

    println!("\n=== Verification complete ({:.1}m) ===", elapsed);
    Ok(())
}

fn write_report(report: &VerificationReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
