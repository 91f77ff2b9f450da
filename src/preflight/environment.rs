//! Build directory checks.

use std::fs;
use std::path::Path;

use super::types::{Check, CheckResult};

/// Check the build directory is initialised and the output directory usable.
pub fn check_build_environment(build_dir: &Path, output_dir: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let local_conf = build_dir.join("conf/local.conf");
    if local_conf.exists() {
        results.push(CheckResult::ready(Check::LocalConf, local_conf.display().to_string()));
    } else {
        results.push(CheckResult::blocking(
            Check::LocalConf,
            format!(
                "Not found in {}. Source oe-init-build-env or set BUILDDIR.",
                build_dir.display()
            ),
        ));
    }

    if output_dir.exists() {
        let scratch = output_dir.join(".preflight-test");
        match fs::write(&scratch, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&scratch);
                results.push(CheckResult::ready(Check::OutputDir, output_dir.display().to_string()));
            }
            Err(e) => results.push(CheckResult::blocking(
                Check::OutputDir,
                format!("Cannot write to {}: {}", output_dir.display(), e),
            )),
        }
    } else {
        results.push(CheckResult::notice(
            Check::OutputDir,
            format!("{} does not exist yet, will be created", output_dir.display()),
        ));
    }

    results
}
