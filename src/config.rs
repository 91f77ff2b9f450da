//! Configuration management for bb-greedy.
//!
//! Reads configuration from environment variables. `main` loads a `.env`
//! file first (via dotenvy), so values there behave like exported ones.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default root target: the reference image.
pub const DEFAULT_TARGET: &str = "core-image-base";

/// Default exclusion: recipes only needed to run packaging itself.
pub const DEFAULT_EXCLUDE: &str = "pseudo-native";

/// Default prepopulate target: every recipe in the layers.
pub const DEFAULT_PREPOPULATE: &str = "world";

/// Name of the output directory inside the build directory.
pub const DEFAULT_OUTPUT_DIR: &str = "bb-greedy";

/// bb-greedy configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// BitBake build directory (BUILDDIR, default: current directory)
    pub build_dir: PathBuf,
    /// bitbake executable (BB_GREEDY_BITBAKE)
    pub bitbake: String,
    /// git executable (BB_GREEDY_GIT)
    pub git: String,
    /// Output directory (BB_GREEDY_OUTPUT, default: $BUILDDIR/bb-greedy)
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_vars(std::env::vars(), &cwd)
    }

    /// Build configuration from explicit variables.
    ///
    /// Relative `BUILDDIR` is resolved against `cwd`; a relative output
    /// directory is resolved against the build directory.
    pub fn from_vars<I>(vars: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let non_empty = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let build_dir = non_empty("BUILDDIR")
            .map(|s| resolve(cwd, &s))
            .unwrap_or_else(|| cwd.to_path_buf());

        let bitbake = non_empty("BB_GREEDY_BITBAKE").unwrap_or_else(|| "bitbake".to_string());
        let git = non_empty("BB_GREEDY_GIT").unwrap_or_else(|| "git".to_string());

        let output_dir = non_empty("BB_GREEDY_OUTPUT")
            .map(|s| resolve(&build_dir, &s))
            .unwrap_or_else(|| build_dir.join(DEFAULT_OUTPUT_DIR));

        Self {
            build_dir,
            bitbake,
            git,
            output_dir,
        }
    }

    /// Output directory, honouring a command-line override.
    pub fn output_dir_or(&self, cli: Option<&Path>) -> PathBuf {
        match cli {
            Some(dir) => resolve(&self.build_dir, &dir.to_string_lossy()),
            None => self.output_dir.clone(),
        }
    }

    /// Whether the build directory looks initialised.
    pub fn has_local_conf(&self) -> bool {
        self.build_dir.join("conf/local.conf").exists()
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  BUILDDIR: {}", self.build_dir.display());
        println!("  BB_GREEDY_BITBAKE: {}", self.bitbake);
        println!("  BB_GREEDY_GIT: {}", self.git);
        println!("  BB_GREEDY_OUTPUT: {}", self.output_dir.display());
        if self.has_local_conf() {
            println!("  conf/local.conf: FOUND");
        } else {
            println!("  conf/local.conf: NOT FOUND (source oe-init-build-env first)");
        }
    }
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
