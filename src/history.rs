//! Buildhistory access.
//!
//! BitBake's `buildhistory` class records every package's metadata in a git
//! repository and commits after each build. A recipe's revisions are the
//! commits touching its package directory, and the verification verdict is
//! the diff of that directory against an earlier commit.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::process::Cmd;

/// How many revisions the verification loop looks at.
pub const REVISION_DEPTH: usize = 2;

/// A commit in the history store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of the build-history store.
pub trait HistoryStore {
    /// Whether `package_path` has ever been recorded.
    fn exists(&self, package_path: &Path) -> bool;

    /// Up to [`REVISION_DEPTH`] most recent revisions touching
    /// `package_path`, most recent first.
    fn revisions(&self, package_path: &Path) -> Result<Vec<Revision>>;

    /// Diff of the current state of `package_path` against `base`.
    /// Empty when nothing changed.
    fn diff(&self, package_path: &Path, base: &Revision) -> Result<String>;
}

/// The git repository under `BUILDHISTORY_DIR`.
#[derive(Debug, Clone)]
pub struct GitHistory {
    program: String,
    root: PathBuf,
}

impl GitHistory {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    /// `package_path` resolved against the repository root.
    fn resolve(&self, package_path: &Path) -> PathBuf {
        self.root.join(package_path)
    }

    /// `package_path` as git expects it: relative to the repository root
    /// when it lies inside it.
    fn pathspec(&self, package_path: &Path) -> PathBuf {
        package_path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| package_path.to_path_buf())
    }

    fn git(&self) -> Cmd {
        Cmd::new(&self.program).arg("-C").arg_path(&self.root)
    }

    fn history_error(package_path: &Path, e: anyhow::Error) -> Error {
        Error::History {
            path: package_path.to_path_buf(),
            message: format!("{e:#}"),
        }
    }
}

impl HistoryStore for GitHistory {
    fn exists(&self, package_path: &Path) -> bool {
        self.resolve(package_path).exists()
    }

    fn revisions(&self, package_path: &Path) -> Result<Vec<Revision>> {
        let result = self
            .git()
            .args(["log", "-n", &REVISION_DEPTH.to_string(), "--format=%H", "--"])
            .arg_path(&self.pathspec(package_path))
            .run()
            .map_err(|e| Self::history_error(package_path, e))?;

        Ok(result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Revision::new)
            .collect())
    }

    fn diff(&self, package_path: &Path, base: &Revision) -> Result<String> {
        let result = self
            .git()
            .args(["diff", "--no-color", base.as_str(), "--"])
            .arg_path(&self.pathspec(package_path))
            .run()
            .map_err(|e| Self::history_error(package_path, e))?;

        Ok(result.stdout)
    }
}
