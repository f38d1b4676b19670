//! appcheck - black-box acceptance test harness
//!
//! Runs declarative YAML test suites against an external application:
//! launch it, watch it, and check what it printed or produced.

use appcheck::{cli, commands::Commands, common::logging};
use clap::Parser;

#[derive(Parser)]
#[command(name = "appcheck", about = "Black-box acceptance test harness")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
