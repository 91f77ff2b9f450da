//! Preflight command - runs preflight checks.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, output: Option<&Path>, strict: bool) -> Result<()> {
    let output_dir = config.output_dir_or(output);
    if strict {
        preflight::run_preflight_or_fail(config, &output_dir)?;
    } else {
        let report = preflight::run_preflight(config, &output_dir);
        report.print();
        if !report.can_run() {
            println!("Use --strict to exit non-zero on blocking issues.");
        }
    }
    Ok(())
}
