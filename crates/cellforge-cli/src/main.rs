mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet, &cli.log_file)?;

    info!("cellforge CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Supercell(args) => {
            info!("Dispatching to 'supercell' command.");
            commands::supercell::run(args)
        }
        Commands::Neighbors(args) => {
            info!("Dispatching to 'neighbors' command.");
            commands::neighbors::run(args)
        }
        Commands::Snapshots(args) => {
            info!("Dispatching to 'snapshots' command.");
            commands::snapshots::run(args)
        }
        Commands::Anneal(args) => {
            info!("Dispatching to 'anneal' command.");
            commands::anneal::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
