//! Shared test utilities: in-memory build engine and history store.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use bb_greedy::engine::{
    BuildEngine, BuildEnvironment, DepGraph, ASSUME_PROVIDED_VAR, PACKAGE_HISTORY_VAR,
};
use bb_greedy::error::{Error, Result};
use bb_greedy::history::{HistoryStore, Revision};
use bb_greedy::settings::BuildSettings;
use tempfile::TempDir;

/// Root of the fake buildhistory.
pub const HISTORY_ROOT: &str = "/build/bb-greedy/buildhistory";

/// Package history path the fake engine reports for `recipe`.
pub fn package_path(recipe: &str) -> PathBuf {
    Path::new(HISTORY_ROOT).join("packages/core2-64-poky-linux").join(recipe)
}

/// A call made against [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(Vec<String>),
    Clean(String),
    Env(Option<String>),
    Graph(String),
}

/// Build engine that records calls and answers from fixed data.
#[derive(Default)]
pub struct FakeEngine {
    calls: RefCell<Vec<Call>>,
    graphs: HashMap<String, DepGraph>,
    envs: HashMap<String, BuildEnvironment>,
    global: BuildEnvironment,
    failing: HashSet<String>,
    settings: Option<BuildSettings>,
    tracking: RefCell<Vec<(String, bool)>>,
    history: Option<Rc<FakeHistory>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// `bitbake -g target` answers with `graph`.
    pub fn with_graph(mut self, target: &str, graph: DepGraph) -> Self {
        self.graphs.insert(target.to_string(), graph);
        self
    }

    /// `bitbake -e recipe` succeeds and reports the package history path.
    pub fn with_package(mut self, recipe: &str) -> Self {
        let env = [(PACKAGE_HISTORY_VAR, package_path(recipe).to_string_lossy().into_owned())]
            .into_iter()
            .collect();
        self.envs.insert(recipe.to_string(), env);
        self
    }

    /// `bitbake -e recipe` succeeds without a package history path.
    pub fn with_empty_env(mut self, recipe: &str) -> Self {
        self.envs.insert(recipe.to_string(), BuildEnvironment::default());
        self
    }

    pub fn with_assume_provided(mut self, recipes: &str) -> Self {
        self.global.insert(ASSUME_PROVIDED_VAR, recipes);
        self
    }

    /// Building or cleaning `target` fails.
    pub fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    /// Record whether history tracking was on at each build.
    pub fn observing(mut self, settings: &BuildSettings) -> Self {
        self.settings = Some(settings.clone());
        self
    }

    /// Tracked builds record a new revision in `history` for every recipe
    /// they build, like buildhistory does.
    pub fn committing_to(mut self, history: &Rc<FakeHistory>) -> Self {
        self.history = Some(Rc::clone(history));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Tracking state at each `build` call, in order.
    pub fn tracking(&self) -> Vec<(String, bool)> {
        self.tracking.borrow().clone()
    }

    pub fn was_cleaned(&self, recipe: &str) -> bool {
        self.calls().contains(&Call::Clean(recipe.to_string()))
    }

    pub fn was_built(&self, recipe: &str) -> bool {
        self.calls().contains(&Call::Build(vec![recipe.to_string()]))
    }

    pub fn was_queried(&self, recipe: &str) -> bool {
        self.calls().contains(&Call::Env(Some(recipe.to_string())))
    }
}

impl FakeEngine {
    fn commit_history(&self, targets: &[String]) {
        let Some(history) = &self.history else {
            return;
        };
        let tracking = self.settings.as_ref().map_or(true, BuildSettings::is_tracking);
        if !tracking {
            return;
        }
        for target in targets {
            let built = match self.graphs.get(target) {
                Some(graph) => graph.closure(target),
                None => [target.clone()].into_iter().collect(),
            };
            for recipe in &built {
                history.record_build(recipe);
            }
        }
    }
}

impl BuildEngine for FakeEngine {
    fn build(&self, targets: &[&str]) -> Result<()> {
        let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
        self.calls.borrow_mut().push(Call::Build(targets.clone()));
        if let Some(settings) = &self.settings {
            self.tracking
                .borrow_mut()
                .push((targets.join(" "), settings.is_tracking()));
        }
        if let Some(t) = targets.iter().find(|t| self.failing.contains(*t)) {
            return Err(Error::Build {
                target: t.clone(),
                message: "ERROR: Task do_compile failed".into(),
            });
        }
        self.commit_history(&targets);
        Ok(())
    }

    fn clean_state(&self, recipe: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Clean(recipe.to_string()));
        if self.failing.contains(recipe) {
            return Err(Error::Build {
                target: recipe.to_string(),
                message: "ERROR: cleansstate failed".into(),
            });
        }
        Ok(())
    }

    fn query_environment(&self, recipe: Option<&str>) -> Result<BuildEnvironment> {
        self.calls
            .borrow_mut()
            .push(Call::Env(recipe.map(str::to_string)));
        match recipe {
            None => Ok(self.global.clone()),
            Some(r) => self.envs.get(r).cloned().ok_or_else(|| Error::EnvironmentQuery {
                recipe: r.to_string(),
                message: "Nothing PROVIDES".into(),
            }),
        }
    }

    fn task_graph(&self, target: &str) -> Result<DepGraph> {
        self.calls.borrow_mut().push(Call::Graph(target.to_string()));
        self.graphs
            .get(target)
            .cloned()
            .ok_or_else(|| Error::Enumeration {
                target: target.to_string(),
                message: "Nothing PROVIDES".into(),
            })
    }
}

struct FakePackage {
    revisions: Vec<Revision>,
    diff: String,
}

/// History store with scripted revisions and diffs per package path.
///
/// Revisions grow when a [`FakeEngine`] committing to this store builds.
#[derive(Default)]
pub struct FakeHistory {
    packages: RefCell<HashMap<PathBuf, FakePackage>>,
    diffs: RefCell<Vec<(PathBuf, Revision)>>,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `recipe` has the given revisions (most recent first) and `diff`
    /// against any baseline.
    pub fn with_package(self, recipe: &str, revisions: &[&str], diff: &str) -> Self {
        self.packages.borrow_mut().insert(
            package_path(recipe),
            FakePackage {
                revisions: revisions.iter().map(|r| Revision::new(*r)).collect(),
                diff: diff.to_string(),
            },
        );
        self
    }

    /// Record a build of `recipe` as a new revision named `<recipe>-r<n>`.
    /// Recipes without a package are not recorded.
    pub fn record_build(&self, recipe: &str) {
        if let Some(package) = self.packages.borrow_mut().get_mut(&package_path(recipe)) {
            let n = package.revisions.len() + 1;
            package
                .revisions
                .insert(0, Revision::new(format!("{recipe}-r{n}")));
        }
    }

    /// All revisions of `recipe`, most recent first.
    pub fn all_revisions(&self, recipe: &str) -> Vec<Revision> {
        self.packages
            .borrow()
            .get(&package_path(recipe))
            .map(|p| p.revisions.clone())
            .unwrap_or_default()
    }

    /// Every `diff` call as `(path, baseline)`.
    pub fn diffs(&self) -> Vec<(PathBuf, Revision)> {
        self.diffs.borrow().clone()
    }
}

impl HistoryStore for FakeHistory {
    fn exists(&self, package_path: &Path) -> bool {
        self.packages.borrow().contains_key(package_path)
    }

    fn revisions(&self, package_path: &Path) -> Result<Vec<Revision>> {
        Ok(self
            .packages
            .borrow()
            .get(package_path)
            .map(|p| p.revisions.iter().take(2).cloned().collect())
            .unwrap_or_default())
    }

    fn diff(&self, package_path: &Path, base: &Revision) -> Result<String> {
        self.diffs
            .borrow_mut()
            .push((package_path.to_path_buf(), base.clone()));
        Ok(self
            .packages
            .borrow()
            .get(package_path)
            .map(|p| p.diff.clone())
            .unwrap_or_default())
    }
}

/// Sample diff of a recipe that picked up an extra library.
pub const GREEDY_DIFF: &str = "\
diff --git a/packages/core2-64-poky-linux/curl/libcurl/latest b/packages/core2-64-poky-linux/curl/libcurl/latest
--- a/packages/core2-64-poky-linux/curl/libcurl/latest
+++ b/packages/core2-64-poky-linux/curl/libcurl/latest
@@ -1,3 +1,3 @@
-RDEPENDS = glibc openssl zlib
+RDEPENDS = glibc libidn2 openssl zlib
";

// =============================================================================
// Git buildhistory repositories
// =============================================================================

pub fn run_git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Empty buildhistory repository.
pub fn history_repo() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    run_git(dir.path(), &["init", "-q"]);
    run_git(dir.path(), &["config", "user.name", "buildhistory"]);
    run_git(dir.path(), &["config", "user.email", "buildhistory@localhost"]);
    dir
}
