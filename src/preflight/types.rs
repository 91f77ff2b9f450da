//! What preflight looks at and what it found.

/// One precondition of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The build engine can be executed.
    Bitbake,
    /// The buildhistory repository can be read.
    Git,
    /// The build directory was set up by `oe-init-build-env`.
    LocalConf,
    /// Generated settings, `TMPDIR` and buildhistory can be written.
    OutputDir,
}

impl Check {
    pub fn label(self) -> &'static str {
        match self {
            Check::Bitbake => "bitbake",
            Check::Git => "git",
            Check::LocalConf => "conf/local.conf",
            Check::OutputDir => "output directory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ready,
    /// The run would fail, usually after hours of population builds.
    Blocking,
    /// The run can start, but something will be created or changed.
    Notice,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub check: Check,
    pub status: CheckStatus,
    /// Resolved path when ready, otherwise what to do about it.
    pub details: String,
}

impl CheckResult {
    pub fn ready(check: Check, details: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Ready,
            details: details.into(),
        }
    }

    pub fn blocking(check: Check, details: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Blocking,
            details: details.into(),
        }
    }

    pub fn notice(check: Check, details: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Notice,
            details: details.into(),
        }
    }
}

/// Results of all preflight checks, in the order they ran.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn get(&self, check: Check) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.check == check)
    }

    fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(move |c| c.status == status)
    }

    /// Whether a verification run can start.
    pub fn can_run(&self) -> bool {
        self.blocking_count() == 0
    }

    pub fn blocking_count(&self) -> usize {
        self.with_status(CheckStatus::Blocking).count()
    }

    pub fn notice_count(&self) -> usize {
        self.with_status(CheckStatus::Notice).count()
    }

    pub fn print(&self) {
        println!("=== Preflight ===\n");

        for c in &self.checks {
            let tag = match c.status {
                CheckStatus::Ready => "PASS",
                CheckStatus::Blocking => "FAIL",
                CheckStatus::Notice => "NOTE",
            };
            println!("  [{}] {}: {}", tag, c.check.label(), c.details);
        }

        println!();
        if self.can_run() {
            println!("Ready to verify.");
        } else {
            println!(
                "{} blocking issue(s), verification cannot run.",
                self.blocking_count()
            );
        }
        if self.notice_count() > 0 {
            println!("{} notice(s).", self.notice_count());
        }
    }
}
