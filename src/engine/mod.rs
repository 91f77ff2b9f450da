//! Build engine interface.
//!
//! The verification loop only needs four things from the build engine:
//! build targets, purge a recipe's cached state, print a recipe's resolved
//! environment, and dump the task graph of a target. [`BuildEngine`] is
//! that seam; [`Bitbake`] is the real implementation.

mod bitbake;
pub mod depgraph;

use std::collections::BTreeMap;

use crate::error::Result;

pub use bitbake::Bitbake;
pub use depgraph::DepGraph;

/// Variable holding the buildhistory path of a recipe's packages.
pub const PACKAGE_HISTORY_VAR: &str = "BUILDHISTORY_DIR_PACKAGE";

/// Variable listing recipes the host provides; they are never built.
pub const ASSUME_PROVIDED_VAR: &str = "ASSUME_PROVIDED";

/// Operations the verification pipeline issues against the build engine.
pub trait BuildEngine {
    /// Build one or more targets, allowing cached artifacts.
    fn build(&self, targets: &[&str]) -> Result<()>;

    /// Purge all build artifacts of `recipe`, including its shared state.
    fn clean_state(&self, recipe: &str) -> Result<()>;

    /// Resolved environment of `recipe`, or the global environment for `None`.
    fn query_environment(&self, recipe: Option<&str>) -> Result<BuildEnvironment>;

    /// Task dependency graph of `target`.
    fn task_graph(&self, target: &str) -> Result<DepGraph>;
}

/// Resolved variables as printed by `bitbake -e`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Parse `bitbake -e` output.
    ///
    /// Only `NAME="value"` assignments (optionally prefixed by `export`) are
    /// kept. Comments, blank lines and function bodies are ignored.
    pub fn parse(output: &str) -> Self {
        let mut vars = BTreeMap::new();
        for line in output.lines() {
            let line = line.trim_end();
            if line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            if !is_var_name(name) {
                continue;
            }
            let Some(value) = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
            else {
                continue;
            };
            vars.insert(name.to_string(), value.to_string());
        }
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whitespace-separated list value of `name`; empty when unset.
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { vars }
    }
}

/// BitBake variable names: no whitespace, may carry flags like `VAR[doc]`
/// or overrides like `VAR:pn-foo`, never empty.
fn is_var_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}
