//! List command - shows the recipes a verification run would process.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::deps;
use crate::engine::Bitbake;
use crate::recipe::RecipeKind;
use crate::settings::BuildSettings;

/// Execute the list command.
pub fn cmd_list(
    config: &Config,
    target: &str,
    exclude: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let settings = BuildSettings::new(config.output_dir_or(output));
    settings.write_untracked()?;
    let engine = Bitbake::new(&config.bitbake, &config.build_dir).with_postread(settings.path());

    let recipes = deps::enumerate(&engine, target, exclude)?;
    for recipe in &recipes {
        println!("{}\t{}", recipe, RecipeKind::classify(recipe));
    }

    let packaged = recipes
        .iter()
        .filter(|r| RecipeKind::classify(r).produces_package())
        .count();
    eprintln!("{} recipe(s), {} with packages", recipes.len(), packaged);
    Ok(())
}
