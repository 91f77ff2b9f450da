//! `bitbake` as a [`BuildEngine`].

use anyhow::Context;
use std::fs;
use std::path::PathBuf;

use super::{BuildEngine, BuildEnvironment, DepGraph};
use crate::error::{Error, Result};
use crate::process::Cmd;

/// Files `bitbake -g` leaves in the build directory.
const TASK_DEPENDS_DOT: &str = "task-depends.dot";
const PN_BUILDLIST: &str = "pn-buildlist";

/// Drives `bitbake` from a build directory.
#[derive(Debug, Clone)]
pub struct Bitbake {
    program: String,
    build_dir: PathBuf,
    /// Extra configuration read after `bitbake.conf` (`-R`).
    postread: Option<PathBuf>,
}

impl Bitbake {
    pub fn new(program: impl Into<String>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            build_dir: build_dir.into(),
            postread: None,
        }
    }

    /// Read `conf` after the build directory's own configuration.
    pub fn with_postread(mut self, conf: impl Into<PathBuf>) -> Self {
        self.postread = Some(conf.into());
        self
    }

    fn cmd(&self) -> Cmd {
        let cmd = Cmd::new(&self.program).dir(&self.build_dir);
        match &self.postread {
            Some(conf) => cmd.arg("-R").arg_path(conf),
            None => cmd,
        }
    }

    /// Remove the `*.dot` files and `pn-buildlist` written by `bitbake -g`.
    fn remove_graph_files(&self) {
        let entries = match fs::read_dir(&self.build_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.build_dir.display(), "cannot list build dir: {e}");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_graph = path.extension().is_some_and(|ext| ext == "dot")
                || path.file_name().is_some_and(|name| name == PN_BUILDLIST);
            if is_graph {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), "cannot remove: {e}");
                }
            }
        }
    }
}

impl BuildEngine for Bitbake {
    fn build(&self, targets: &[&str]) -> Result<()> {
        self.cmd()
            .args(targets)
            .error_msg(format!("bitbake {} failed", targets.join(" ")))
            .run_interactive()
            .map_err(|e| Error::Build {
                target: targets.join(" "),
                message: format!("{e:#}"),
            })?;
        Ok(())
    }

    fn clean_state(&self, recipe: &str) -> Result<()> {
        self.cmd()
            .args(["-c", "cleansstate", recipe])
            .error_msg(format!("bitbake -c cleansstate {} failed", recipe))
            .run()
            .map_err(|e| Error::Build {
                target: recipe.to_string(),
                message: format!("{e:#}"),
            })?;
        Ok(())
    }

    fn query_environment(&self, recipe: Option<&str>) -> Result<BuildEnvironment> {
        let mut cmd = self.cmd().arg("-e");
        if let Some(recipe) = recipe {
            cmd = cmd.arg(recipe);
        }
        let result = cmd.run().map_err(|e| Error::EnvironmentQuery {
            recipe: recipe.unwrap_or("(global)").to_string(),
            message: format!("{e:#}"),
        })?;
        Ok(BuildEnvironment::parse(&result.stdout))
    }

    fn task_graph(&self, target: &str) -> Result<DepGraph> {
        let enumeration_error = |e: anyhow::Error| Error::Enumeration {
            target: target.to_string(),
            message: format!("{e:#}"),
        };

        let generated = self
            .cmd()
            .args(["-g", target])
            .run()
            .and_then(|_| {
                let dot = self.build_dir.join(TASK_DEPENDS_DOT);
                fs::read_to_string(&dot)
                    .with_context(|| format!("Failed to read {}", dot.display()))
            });
        self.remove_graph_files();

        let graph = DepGraph::parse_dot(&generated.map_err(enumeration_error)?);
        if graph.is_empty() {
            return Err(Error::Enumeration {
                target: target.to_string(),
                message: format!("{} lists no tasks", TASK_DEPENDS_DOT),
            });
        }
        tracing::debug!(root = target, recipes = graph.len(), "parsed task graph");
        Ok(graph)
    }
}
