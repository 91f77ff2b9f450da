//! bb-greedy - greedy linking detector for BitBake builds.
//!
//! Builds a target with buildhistory enabled, then cleans and rebuilds every
//! recipe it depends on, one at a time. A recipe whose package metadata
//! changes after its isolated rebuild links against something it only found
//! by accident.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use bb_greedy::commands;
use bb_greedy::config::{self, Config};
use bb_greedy::pipeline::Plan;

#[derive(Parser)]
#[command(name = "bb-greedy")]
#[command(about = "Detect greedy linking by rebuilding each dependency in isolation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(
    after_help = "QUICK START:\n  source oe-init-build-env\n  bb-greedy preflight         Check tools and build directory\n  bb-greedy list              Show recipes that would be verified\n  bb-greedy -k                Verify core-image-base, report all defects"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    verify: VerifyArgs,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct VerifyArgs {
    /// Target whose dependencies are verified
    #[arg(default_value = config::DEFAULT_TARGET)]
    target: String,

    /// Target whose dependency closure is not verified ('' for none)
    #[arg(short = 'x', long, default_value = config::DEFAULT_EXCLUDE)]
    exclude: String,

    /// Target built without buildhistory to populate the sysroot
    #[arg(short, long, default_value = config::DEFAULT_PREPOPULATE)]
    prepopulate: String,

    /// Output directory (default: $BUILDDIR/bb-greedy)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verify only the target itself, not its dependencies
    #[arg(short, long)]
    short_circuit: bool,

    /// Remove the output directory before starting
    #[arg(short, long)]
    wipe: bool,

    /// Keep verifying after a defect and report all of them at the end
    #[arg(short, long)]
    keep_going: bool,

    /// Write the verification report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the recipes a run would verify
    List {
        /// Target whose dependencies are listed
        #[arg(default_value = config::DEFAULT_TARGET)]
        target: String,

        /// Target whose dependency closure is left out ('' for none)
        #[arg(short = 'x', long, default_value = config::DEFAULT_EXCLUDE)]
        exclude: String,

        /// Output directory (default: $BUILDDIR/bb-greedy)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run preflight checks
    Preflight {
        /// Exit non-zero if any check fails
        #[arg(long)]
        strict: bool,

        /// Output directory (default: $BUILDDIR/bb-greedy)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resolved configuration
    ShowConfig {
        /// Output directory (default: $BUILDDIR/bb-greedy)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    match cli.command {
        Some(Commands::List {
            target,
            exclude,
            output,
        }) => {
            let exclude = non_empty(exclude);
            commands::cmd_list(&config, &target, exclude.as_deref(), output.as_deref())?;
        }

        Some(Commands::Preflight { strict, output }) => {
            commands::cmd_preflight(&config, output.as_deref(), strict)?;
        }

        Some(Commands::ShowConfig { output }) => {
            commands::cmd_show_config(&config, output.as_deref());
        }

        None => {
            let args = cli.verify;
            let plan = Plan {
                target: args.target,
                exclude: non_empty(args.exclude),
                prepopulate: args.prepopulate,
                short_circuit: args.short_circuit,
                keep_going: args.keep_going,
            };
            commands::cmd_verify(
                &config,
                commands::VerifyOptions {
                    plan,
                    output: args.output,
                    wipe: args.wipe,
                    report: args.report,
                },
            )?;
        }
    }

    Ok(())
}
