//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `verify` - Build, then rebuild each dependency in isolation
//! - `list` - Print the recipes a run would verify
//! - `preflight` - Run preflight checks
//! - `show` - Display configuration

pub mod list;
mod preflight;
mod show;
pub mod verify;

pub use list::cmd_list;
pub use preflight::cmd_preflight;
pub use show::cmd_show_config;
pub use verify::{cmd_verify, VerifyOptions};
