//! Recipe classification.
//!
//! BitBake names build-time-only variants of a recipe with a suffix
//! (`-native`, `-cross`, ...). Those variants never produce an installable
//! package, so they have no package metadata to verify.

use serde::Serialize;
use std::fmt;

/// The variant kind of a recipe, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeKind {
    /// Target recipe producing installable packages.
    Packaged,
    /// Host tool built for the build machine (`-native`).
    Native,
    /// Cross toolchain component (`-cross`, `-crosssdk`).
    Cross,
    /// Toolchain built to run inside the SDK (`-cross-canadian-<arch>`).
    CrossCanadian,
}

const NATIVE_SUFFIXES: &[&str] = &["-native"];
const CROSS_SUFFIXES: &[&str] = &["-cross", "-crosssdk"];
/// Arch-qualified cross recipes, e.g. `gcc-cross-x86_64`.
const CROSS_MARKERS: &[&str] = &["-cross-", "-crosssdk-"];
/// Cross-canadian recipes carry the SDK arch after the marker.
const CROSS_CANADIAN_MARKER: &str = "-cross-canadian";

impl RecipeKind {
    /// Classify a recipe by name.
    pub fn classify(recipe: &str) -> Self {
        if recipe.contains(CROSS_CANADIAN_MARKER) {
            RecipeKind::CrossCanadian
        } else if NATIVE_SUFFIXES.iter().any(|s| recipe.ends_with(s)) {
            RecipeKind::Native
        } else if CROSS_SUFFIXES.iter().any(|s| recipe.ends_with(s))
            || CROSS_MARKERS.iter().any(|m| recipe.contains(m))
        {
            RecipeKind::Cross
        } else {
            RecipeKind::Packaged
        }
    }

    /// Whether recipes of this kind produce an installable package.
    pub fn produces_package(self) -> bool {
        matches!(self, RecipeKind::Packaged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecipeKind::Packaged => "packaged",
            RecipeKind::Native => "native",
            RecipeKind::Cross => "cross",
            RecipeKind::CrossCanadian => "cross-canadian",
        }
    }
}

impl fmt::Display for RecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
