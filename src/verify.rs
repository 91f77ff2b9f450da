//! Rebuild verification loop.
//!
//! Each recipe goes through, in order:
//!
//! 1. classification: build-only variants have no package and are skipped;
//! 2. environment query: failure skips the recipe, it never aborts the run;
//! 3. history lookup: no recorded package directory means the package came
//!    from somewhere the initial build did not record;
//! 4. `cleansstate` + rebuild, both fatal on failure;
//! 5. revision listing: fewer than two revisions after the rebuild means
//!    there is no baseline to compare against;
//! 6. diff against the second-most-recent revision, the state recorded
//!    before this rebuild.
//!
//! Recipes are processed strictly one after another. They share one sysroot,
//! so a diff is only attributable while a single recipe is being rebuilt.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::engine::{BuildEngine, PACKAGE_HISTORY_VAR};
use crate::error::{Error, Result};
use crate::history::{HistoryStore, Revision};
use crate::recipe::RecipeKind;
use crate::status;

/// What happened to one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    /// Build-only variant; produces no installable package.
    SkippedNoPackage { kind: RecipeKind },
    /// `bitbake -e` failed or lacked the package history path.
    SkippedNoEnvironment { reason: String },
    /// The package was never recorded, e.g. it came from the sstate cache.
    SkippedNoHistory { path: PathBuf },
    /// Not enough revisions to have a baseline.
    SkippedNoBaseline { revisions: usize },
    /// Rebuilt in isolation with identical package metadata.
    Passed,
    /// Package metadata changed after the isolated rebuild.
    Failed { diff: String },
}

impl Outcome {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Outcome::SkippedNoPackage { .. }
                | Outcome::SkippedNoEnvironment { .. }
                | Outcome::SkippedNoHistory { .. }
                | Outcome::SkippedNoBaseline { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::SkippedNoPackage { .. } => "skipped (no package)",
            Outcome::SkippedNoEnvironment { .. } => "skipped (no environment)",
            Outcome::SkippedNoHistory { .. } => "skipped (no history)",
            Outcome::SkippedNoBaseline { .. } => "skipped (no change in history)",
            Outcome::Passed => "passed (no diff)",
            Outcome::Failed { .. } => "failed (diff found)",
        }
    }
}

/// Outcome of one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub recipe: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// All outcomes of a run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub results: Vec<Verification>,
}

impl VerificationReport {
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|v| v.outcome == Outcome::Passed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|v| v.outcome.is_skip()).count()
    }

    /// Recipes whose metadata changed, with their diffs.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|v| match &v.outcome {
            Outcome::Failed { diff } => Some((v.recipe.as_str(), diff.as_str())),
            _ => None,
        })
    }

    pub fn fail_count(&self) -> usize {
        self.failures().count()
    }

    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn get(&self, recipe: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|v| v.recipe == recipe)
            .map(|v| &v.outcome)
    }

    /// Print the summary to stdout.
    pub fn print(&self) {
        println!("=== Verification Results ===\n");

        for v in &self.results {
            let tag = match v.outcome {
                Outcome::Passed => "PASS",
                Outcome::Failed { .. } => "FAIL",
                _ => "SKIP",
            };
            println!("  [{}] {}: {}", tag, v.recipe, v.outcome.label());
        }

        println!();
        println!(
            "Summary: {} passed, {} failed, {} skipped ({} total)",
            self.passed_count(),
            self.fail_count(),
            self.skipped_count(),
            self.results.len()
        );
    }
}

/// Runs the per-recipe verification against a build engine and history store.
pub struct Verifier<'a, E, H> {
    engine: &'a E,
    history: &'a H,
    keep_going: bool,
}

impl<'a, E: BuildEngine, H: HistoryStore> Verifier<'a, E, H> {
    pub fn new(engine: &'a E, history: &'a H) -> Self {
        Self {
            engine,
            history,
            keep_going: false,
        }
    }

    /// Record defects and continue instead of stopping at the first one.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Verify every recipe in order.
    ///
    /// Without keep-going the first defect ends the run as
    /// [`Error::DefectFound`]. With keep-going all defects end up in the
    /// returned report and the caller decides how to fail.
    pub fn run(&self, recipes: &[String]) -> Result<VerificationReport> {
        let mut report = VerificationReport::default();

        for recipe in recipes {
            let outcome = self.verify_recipe(recipe)?;
            match &outcome {
                Outcome::Failed { diff } if !self.keep_going => {
                    return Err(Error::DefectFound {
                        recipe: recipe.clone(),
                        diff: diff.clone(),
                    });
                }
                _ => {}
            }
            report.results.push(Verification {
                recipe: recipe.clone(),
                outcome,
            });
        }

        Ok(report)
    }

    /// Verify a single recipe. Only fatal failures are returned as errors.
    pub fn verify_recipe(&self, recipe: &str) -> Result<Outcome> {
        let kind = RecipeKind::classify(recipe);
        if !kind.produces_package() {
            println!("[SKIP] {}: {} recipe, no package", recipe, kind);
            return Ok(Outcome::SkippedNoPackage { kind });
        }

        let package_path = match self.package_path(recipe) {
            Ok(path) => path,
            Err(e) => {
                println!("[SKIP] {}: {}", recipe, e);
                tracing::warn!(recipe, error = %e, "environment query failed");
                return Ok(Outcome::SkippedNoEnvironment {
                    reason: e.to_string(),
                });
            }
        };

        if !self.history.exists(&package_path) {
            println!("[SKIP] {}: no buildhistory for {}", recipe, package_path.display());
            return Ok(Outcome::SkippedNoHistory { path: package_path });
        }

        status::step(format!("Cleaning {}", recipe), || {
            self.engine.clean_state(recipe)
        })?;
        status::step(format!("Rebuilding {}", recipe), || {
            self.engine.build(&[recipe])
        })?;

        let revisions = self.history.revisions(&package_path)?;
        let Some(baseline) = baseline(&revisions) else {
            println!(
                "[SKIP] {}: {} revision(s) in buildhistory after rebuild, no baseline",
                recipe,
                revisions.len()
            );
            return Ok(Outcome::SkippedNoBaseline {
                revisions: revisions.len(),
            });
        };
        tracing::debug!(recipe, %baseline, "baseline selected");

        let diff = self.history.diff(&package_path, baseline)?;
        if diff.trim().is_empty() {
            println!("[PASS] {}", recipe);
            Ok(Outcome::Passed)
        } else {
            println!("[FAIL] {}: package changed after an isolated rebuild", recipe);
            Ok(Outcome::Failed { diff })
        }
    }

    fn package_path(&self, recipe: &str) -> Result<PathBuf> {
        let env = self.engine.query_environment(Some(recipe))?;
        env.get(PACKAGE_HISTORY_VAR)
            .filter(|p| !p.is_empty())
            .map(|p| Path::new(p).to_path_buf())
            .ok_or_else(|| Error::EnvironmentQuery {
                recipe: recipe.to_string(),
                message: format!("{} is not set", PACKAGE_HISTORY_VAR),
            })
    }
}

/// The revision recorded immediately before the most recent one.
///
/// `revisions` is most recent first and listed after the rebuild, so the
/// first entry is the rebuild's own record and the second is the state
/// before it. A rebuild that records nothing new is compared with the
/// change before the latest one, never with itself.
pub fn baseline(revisions: &[Revision]) -> Option<&Revision> {
    revisions.get(1)
}
