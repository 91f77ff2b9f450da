//! Recipe dependency graph from `bitbake -g` output.
//!
//! `bitbake -g <target>` writes `task-depends.dot`, a task-level graph with
//! nodes like `"busybox.do_compile"`. Collapsing tasks onto their recipe
//! gives the recipe-level graph the enumerator walks.

use std::collections::{BTreeMap, BTreeSet};

/// Recipe-level dependency graph. Edges point from a recipe to the recipes
/// it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepGraph {
    deps: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    /// Parse the contents of a `task-depends.dot` file.
    pub fn parse_dot(dot: &str) -> Self {
        let mut graph = Self::default();
        for line in dot.lines() {
            let line = line.trim();
            let Some((first, rest)) = take_quoted(line) else {
                continue;
            };
            let from = recipe_of_task(first);
            graph.add_recipe(from);

            if let Some(rest) = rest.trim_start().strip_prefix("->") {
                if let Some((second, _)) = take_quoted(rest.trim_start()) {
                    graph.add_edge(from, recipe_of_task(second));
                }
            }
        }
        graph
    }

    /// Build a graph from `(recipe, dependency)` pairs.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = Self::default();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    pub fn add_recipe(&mut self, recipe: &str) {
        self.deps.entry(recipe.to_string()).or_default();
    }

    /// Record that `from` depends on `to`. Self-edges only register the node.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_recipe(to);
        let entry = self.deps.entry(from.to_string()).or_default();
        if from != to {
            entry.insert(to.to_string());
        }
    }

    pub fn contains(&self, recipe: &str) -> bool {
        self.deps.contains_key(recipe)
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Direct dependencies of `recipe`.
    pub fn dependencies(&self, recipe: &str) -> impl Iterator<Item = &str> {
        self.deps
            .get(recipe)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// `root` plus every recipe reachable from it. Empty if `root` is unknown.
    pub fn closure(&self, root: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        if !self.contains(root) {
            return seen;
        }
        let mut stack = vec![root.to_string()];
        while let Some(recipe) = stack.pop() {
            if !seen.insert(recipe.clone()) {
                continue;
            }
            for dep in self.dependencies(&recipe) {
                if !seen.contains(dep) {
                    stack.push(dep.to_string());
                }
            }
        }
        seen
    }

    /// Order `recipes` so that dependencies come before their dependents.
    ///
    /// Ready recipes are taken in name order. Recipe-level cycles (the task
    /// graph is acyclic, the collapsed graph need not be) are broken by
    /// taking the smallest remaining name, so the result is deterministic.
    pub fn build_order(&self, recipes: &BTreeSet<String>) -> Vec<String> {
        let mut pending: BTreeMap<&str, BTreeSet<&str>> = recipes
            .iter()
            .map(|r| {
                let deps = self
                    .dependencies(r)
                    .filter(|d| recipes.contains(*d))
                    .collect();
                (r.as_str(), deps)
            })
            .collect();

        let mut order = Vec::with_capacity(pending.len());
        while let Some(&first) = pending.keys().next() {
            let next = match pending.iter().find(|(_, deps)| deps.is_empty()) {
                Some((recipe, _)) => *recipe,
                None => {
                    tracing::debug!(recipe = first, "breaking dependency cycle");
                    first
                }
            };
            pending.remove(next);
            for deps in pending.values_mut() {
                deps.remove(next);
            }
            order.push(next.to_string());
        }
        order
    }
}

/// Split a leading `"quoted"` token off `s`.
fn take_quoted(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// `busybox.do_compile` -> `busybox`. Recipe names may contain dots
/// (`python3-3.12`), task names never do.
fn recipe_of_task(task: &str) -> &str {
    match task.rsplit_once(".do_") {
        Some((recipe, _)) => recipe,
        None => task.rsplit_once('.').map_or(task, |(recipe, _)| recipe),
    }
}
