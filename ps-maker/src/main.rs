//! ps-maker CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{GridCommand, TemplatesCommand};
use ps_maker::observability::{self, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ps-maker")]
#[command(version)]
#[command(about = "Grid scaffolding generator for PrestaShop", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file to use instead of `ps-maker.toml`
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a grid, its services, controller action and view
    Grid(GridCommand),
    /// Inspect or export the embedded templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    observability::init(cli.verbose, format)?;

    match cli.command {
        Commands::Grid(command) => {
            command.execute(cli.config.as_deref())?;
        }
        Commands::Templates { command } => {
            command.execute()?;
        }
    }

    Ok(())
}
