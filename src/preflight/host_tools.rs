//! Host tool availability checks.

use super::types::{Check, CheckResult};

/// Check that the build engine and history tool can be found.
pub fn check_host_tools(bitbake: &str, git: &str) -> Vec<CheckResult> {
    vec![
        check_tool(
            Check::Bitbake,
            bitbake,
            "Source oe-init-build-env so bitbake is on PATH, or set BB_GREEDY_BITBAKE",
        ),
        check_tool(Check::Git, git, "Install git; buildhistory is a git repository"),
    ]
}

/// Resolve `tool` on PATH, or as a path.
fn check_tool(check: Check, tool: &str, hint: &str) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::ready(check, path.display().to_string()),
        Err(_) => CheckResult::blocking(check, format!("{} not found. {}", tool, hint)),
    }
}
