//! A full verification run.
//!
//! 1. Work out which recipes to verify.
//! 2. Build the target with history tracking on, so every package the
//!    target needs gets a first buildhistory revision.
//! 3. Build the prepopulate target with tracking off. This fills the shared
//!    sysroot with every optional library a greedy configure script could
//!    find, without recording those extra packages.
//! 4. Turn tracking back on and verify each recipe.

use crate::deps;
use crate::engine::BuildEngine;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::settings::BuildSettings;
use crate::status;
use crate::verify::{VerificationReport, Verifier};

/// What to verify and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Root target to build.
    pub target: String,
    /// Target whose dependency closure is never verified.
    pub exclude: Option<String>,
    /// Target built without tracking to populate the sysroot.
    pub prepopulate: String,
    /// Verify only `target` itself, not its dependencies.
    pub short_circuit: bool,
    /// Continue past defects and report them all at the end.
    pub keep_going: bool,
}

impl Plan {
    pub fn new(target: impl Into<String>, prepopulate: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            exclude: None,
            prepopulate: prepopulate.into(),
            short_circuit: false,
            keep_going: false,
        }
    }
}

/// Recipes the plan verifies.
pub fn recipes_to_verify<E: BuildEngine>(engine: &E, plan: &Plan) -> Result<Vec<String>> {
    if plan.short_circuit {
        return Ok(vec![plan.target.clone()]);
    }
    status::step(format!("Enumerating dependencies of {}", plan.target), || {
        deps::enumerate(engine, &plan.target, plan.exclude.as_deref())
    })
}

/// Run the population builds and the verification loop.
pub fn run<E: BuildEngine, H: HistoryStore>(
    engine: &E,
    history: &H,
    settings: &BuildSettings,
    plan: &Plan,
) -> Result<VerificationReport> {
    settings.write_untracked()?;

    let recipes = recipes_to_verify(engine, plan)?;
    println!("{} recipe(s) to verify", recipes.len());

    {
        let tracking = settings.track_history()?;
        status::step(format!("Building {}", plan.target), || {
            engine.build(&[plan.target.as_str()])
        })?;
        tracking.release()?;
    }

    if recipes.contains(&plan.prepopulate) {
        tracing::info!(
            prepopulate = %plan.prepopulate,
            "prepopulate target is verified itself, skipping untracked build"
        );
    } else {
        status::step(format!("Prepopulating with {}", plan.prepopulate), || {
            engine.build(&[plan.prepopulate.as_str()])
        })?;
    }

    let _tracking = settings.track_history()?;
    Verifier::new(engine, history)
        .keep_going(plan.keep_going)
        .run(&recipes)
}
