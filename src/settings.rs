//! Generated BitBake settings.
//!
//! The tool never edits the user's `local.conf`. It writes its own file into
//! the output directory and passes it to every bitbake invocation with `-R`.
//! The file redirects `TMPDIR` and `BUILDHISTORY_DIR` into the output
//! directory and toggles the `buildhistory` class.
//!
//! History tracking is only on while a [`HistoryTracking`] guard is alive.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the generated file inside the output directory.
pub const SETTINGS_FILE: &str = "bb-greedy.conf";

const TRACKING_ON: &str = "INHERIT += \"buildhistory\"";
const TRACKING_OFF: &str = "INHERIT:remove = \"buildhistory\"";

/// Paths of one run's isolated output directory.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    output_dir: PathBuf,
}

impl BuildSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The generated configuration file.
    pub fn path(&self) -> PathBuf {
        self.output_dir.join(SETTINGS_FILE)
    }

    /// BitBake's `TMPDIR` for this run.
    pub fn tmp_dir(&self) -> PathBuf {
        self.output_dir.join("tmp")
    }

    /// Root of the buildhistory git repository.
    pub fn history_dir(&self) -> PathBuf {
        self.output_dir.join("buildhistory")
    }

    /// Settings file content for the given tracking state.
    pub fn render(&self, tracking: bool) -> String {
        format!(
            "# Generated by bb-greedy. Rewritten on every run.\n\
             TMPDIR = \"{}\"\n\
             BUILDHISTORY_DIR = \"{}\"\n\
             BUILDHISTORY_COMMIT = \"1\"\n\
             {}\n",
            self.tmp_dir().display(),
            self.history_dir().display(),
            if tracking { TRACKING_ON } else { TRACKING_OFF },
        )
    }

    /// Write the settings file with tracking off.
    pub fn write_untracked(&self) -> Result<()> {
        self.write(false)
    }

    /// Turn history tracking on until the returned guard is dropped.
    pub fn track_history(&self) -> Result<HistoryTracking<'_>> {
        self.write(true)?;
        tracing::debug!(path = %self.path().display(), "history tracking on");
        Ok(HistoryTracking { settings: self })
    }

    /// Whether the file on disk currently enables tracking.
    pub fn is_tracking(&self) -> bool {
        fs::read_to_string(self.path())
            .map(|content| content.lines().any(|line| line == TRACKING_ON))
            .unwrap_or(false)
    }

    fn write(&self, tracking: bool) -> Result<()> {
        let path = self.path();
        let settings_error = |source: std::io::Error| Error::Settings {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.output_dir).map_err(&settings_error)?;
        fs::write(&path, self.render(tracking)).map_err(&settings_error)
    }
}

/// History tracking is enabled for as long as this guard lives.
#[must_use = "tracking is turned off again when the guard is dropped"]
pub struct HistoryTracking<'a> {
    settings: &'a BuildSettings,
}

impl HistoryTracking<'_> {
    /// Turn tracking off, reporting write failures.
    pub fn release(self) -> Result<()> {
        let settings = self.settings;
        std::mem::forget(self);
        settings.write(false)?;
        tracing::debug!(path = %settings.path().display(), "history tracking off");
        Ok(())
    }
}

impl Drop for HistoryTracking<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.settings.write(false) {
            eprintln!("[WARN] Failed to turn history tracking off: {}", e);
        }
    }
}
