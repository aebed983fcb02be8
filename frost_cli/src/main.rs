//! # Frostline CLI
//!
//! Command-line front end for the frost-depth engine.
//!
//! ```text
//! frostline calc --soil 14_3 --layer "Asphalt:0,1:2300:0,02:1,4:1900" --material 1:0.2
//! frostline soils
//! frostline history list
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use frost_core::config::{default_config_path, FrostConfig};
use frost_core::reference::{DirectoryReference, EmbeddedReference, ReferenceSource};
use frost_core::CalcError;

/// Frost penetration depth for layered pavement cross-sections
#[derive(Parser, Debug)]
#[command(name = "frostline", version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.frostline/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate frost depth for a cross-section
    Calc(commands::calc::CalcArgs),
    /// List reference soils
    Soils(commands::reference::ListArgs),
    /// List construction materials
    Materials(commands::reference::ListArgs),
    /// Saved calculations
    #[command(subcommand)]
    History(commands::history::HistoryCommand),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<FrostConfig> {
    match explicit {
        Some(path) if !path.exists() => bail!("Config file {} does not exist", path.display()),
        Some(path) => Ok(FrostConfig::load(path)),
        None => Ok(default_config_path()
            .map(|path| FrostConfig::load(&path))
            .unwrap_or_default()),
    }
}

async fn dispatch<S: ReferenceSource>(
    cli: &Cli,
    matches: &ArgMatches,
    config: &FrostConfig,
    source: &S,
) -> Result<()> {
    match &cli.command {
        Commands::Calc(args) => {
            commands::calc::execute(args, matches.subcommand_matches("calc"), config, source).await
        }
        Commands::Soils(args) => commands::reference::soils(args, source).await,
        Commands::Materials(args) => commands::reference::materials(args, source).await,
        Commands::History(command) => commands::history::execute(command, config),
    }
}

fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let outcome = runtime.block_on(async {
        match config.reference.data_dir.clone() {
            Some(dir) => dispatch(&cli, &matches, &config, &DirectoryReference::new(dir)).await,
            None => dispatch(&cli, &matches, &config, &EmbeddedReference).await,
        }
    });

    if let Err(err) = &outcome {
        if let Some(calc) = err.downcast_ref::<CalcError>() {
            if let Ok(json) = serde_json::to_string_pretty(calc) {
                eprintln!("{}", json);
            }
        }
    }
    outcome
}
