//! bb-greedy library.
//!
//! Detects greedy linking in BitBake recipes: a recipe whose configure step
//! picks up an optional dependency just because it is in the sysroot. Each
//! dependency of a target is cleaned and rebuilt on its own, and any change
//! in its buildhistory package metadata is reported.

pub mod commands;
pub mod config;
pub mod deps;
pub mod engine;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod recipe;
pub mod settings;
pub mod status;
pub mod verify;

pub use error::{Error, Result};
