//! Dependency enumeration.
//!
//! Produces the recipes to verify: the build-dependency closure of the
//! target, minus the closure of the exclude target and minus everything the
//! host is assumed to provide.

use std::collections::BTreeSet;

use crate::engine::{BuildEngine, ASSUME_PROVIDED_VAR};
use crate::error::{Error, Result};

/// Recipes `target` depends on, directly or transitively, in
/// dependency-first order. The target itself is not included.
pub fn enumerate<E: BuildEngine>(
    engine: &E,
    target: &str,
    exclude: Option<&str>,
) -> Result<Vec<String>> {
    let mut excluded = BTreeSet::new();

    if let Some(exclude) = exclude.filter(|e| !e.is_empty()) {
        let graph = engine.task_graph(exclude)?;
        let closure = graph.closure(exclude);
        if closure.is_empty() {
            return Err(Error::Enumeration {
                target: exclude.to_string(),
                message: "target not present in its own task graph".to_string(),
            });
        }
        tracing::debug!(exclude, recipes = closure.len(), "excluding closure");
        excluded.extend(closure);
    }

    let global = engine
        .query_environment(None)
        .map_err(|e| Error::Enumeration {
            target: target.to_string(),
            message: e.to_string(),
        })?;
    excluded.extend(global.get_list(ASSUME_PROVIDED_VAR));

    let graph = engine.task_graph(target)?;
    let mut closure = graph.closure(target);
    if closure.is_empty() {
        return Err(Error::Enumeration {
            target: target.to_string(),
            message: "target not present in its own task graph".to_string(),
        });
    }
    // The root itself is built but not verified here; short-circuit mode covers it.
    closure.remove(target);
    closure.retain(|recipe| !excluded.contains(recipe));

    let order = graph.build_order(&closure);
    tracing::info!(root = target, recipes = order.len(), excluded = excluded.len(), "enumerated");
    Ok(order)
}
