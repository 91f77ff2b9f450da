//! Error taxonomy for a verification run.
//!
//! `Build`, `Enumeration`, `History` and `Settings` are fatal.
//! `EnvironmentQuery` is recovered by the verification loop as a per-recipe
//! skip. `DefectFound` and `DefectsFound` carry the actual findings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// bitbake failed to build or clean a target.
    #[error("build of '{target}' failed: {message}")]
    Build { target: String, message: String },

    /// `bitbake -e` failed or did not yield the required variables.
    #[error("environment query for '{recipe}' failed: {message}")]
    EnvironmentQuery { recipe: String, message: String },

    /// The dependency closure of a target could not be resolved.
    #[error("could not enumerate dependencies of '{target}': {message}")]
    Enumeration { target: String, message: String },

    /// The buildhistory repository could not be read.
    #[error("buildhistory query for {} failed: {message}", path.display())]
    History { path: PathBuf, message: String },

    /// A recipe's package metadata changed after an isolated rebuild.
    ///
    /// Displays as the bare diff so it can be the run's terminal message.
    #[error("{diff}")]
    DefectFound { recipe: String, diff: String },

    /// Keep-going mode finished with at least one defect.
    #[error("{count} recipe(s) changed after an isolated rebuild")]
    DefectsFound { count: usize },

    /// The generated settings file could not be written.
    #[error("failed to write settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error is a verification finding rather than a tool failure.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::DefectFound { .. } | Error::DefectsFound { .. })
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_displays_as_bare_diff() {
        let err = Error::DefectFound {
            recipe: "curl".into(),
            diff: "-RDEPENDS = libc\n+RDEPENDS = libc libidn2".into(),
        };
        assert_eq!(err.to_string(), "-RDEPENDS = libc\n+RDEPENDS = libc libidn2");
        assert!(err.is_defect());
    }

    #[test]
    fn build_error_names_target() {
        let err = Error::Build {
            target: "core-image-base".into(),
            message: "exit code 1".into(),
        };
        assert!(err.to_string().contains("core-image-base"));
        assert!(!err.is_defect());
    }
}
