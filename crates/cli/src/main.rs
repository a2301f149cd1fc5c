use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use cartograph::config::Config;
use cartograph::plan;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cartograph", about = "Tracks which map tiles need re-rendering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the world and mark tiles with in-scope chunks dirty.
    Plan {
        /// Path to the JSON config.
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the dirty tiles in render order.
    List {
        /// Path to the JSON config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Plan { config } => {
            let config = Config::load(&config)?;
            let summary = plan::plan(&config)?;
            println!(
                "{} tiles dirty ({} new), {} chunks, {} regions, {} skipped",
                summary.tiles,
                summary.new_tiles,
                summary.chunks,
                summary.regions,
                summary.skipped_regions
            );
        }
        Command::List { config } => {
            let config = Config::load(&config)?;
            let listing = plan::list(&config)?;
            for tile in &listing.tiles {
                println!("{} {}", tile.x, tile.y);
            }
            match listing.bounds {
                Some((min, max)) => println!(
                    "{} tiles, bounds ({}, {}) to ({}, {})",
                    listing.tiles.len(),
                    min.x,
                    min.y,
                    max.x,
                    max.y
                ),
                None => println!("no dirty tiles"),
            }
        }
    }
    Ok(())
}
