//! Show command - displays the resolved configuration.

use std::path::Path;

use crate::config::{self, Config};
use crate::settings::BuildSettings;

/// Execute the show-config command.
pub fn cmd_show_config(config: &Config, output: Option<&Path>) {
    config.print();

    let settings = BuildSettings::new(config.output_dir_or(output));
    println!();
    println!("Run layout:");
    println!("  Settings file: {}", settings.path().display());
    println!("  TMPDIR: {}", settings.tmp_dir().display());
    println!("  BUILDHISTORY_DIR: {}", settings.history_dir().display());
    println!();
    println!("Defaults:");
    println!("  target: {}", config::DEFAULT_TARGET);
    println!("  exclude: {}", config::DEFAULT_EXCLUDE);
    println!("  prepopulate: {}", config::DEFAULT_PREPOPULATE);
}
