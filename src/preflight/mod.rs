//! Preflight checks before a verification run.
//!
//! A run takes hours; failing on a missing tool after the population build
//! wastes all of it. Run with `bb-greedy preflight` to check by hand.

mod environment;
mod host_tools;
mod types;

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;

pub use types::{Check, CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config, output_dir: &Path) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(host_tools::check_host_tools(&config.bitbake, &config.git));

    println!("Checking build directory...");
    checks.extend(environment::check_build_environment(&config.build_dir, output_dir));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config, output_dir: &Path) -> Result<()> {
    let report = run_preflight(config, output_dir);
    report.print();

    if !report.can_run() {
        bail!(
            "Preflight failed: {} blocking issue(s). Fix them before verifying.",
            report.blocking_count()
        );
    }

    Ok(())
}
