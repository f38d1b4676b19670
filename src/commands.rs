//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every case declared in a suite file
    Run {
        /// Path to the YAML suite file
        suite: PathBuf,

        /// Directory the application under test is installed in
        /// (overrides the suite's 'base_dir' key)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Only run cases whose name contains this string
        #[arg(long)]
        filter: Option<String>,

        /// Directory verified artifacts are archived into
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output (show resolved command lines)
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the cases a suite file declares, without running anything
    List {
        /// Path to the YAML suite file
        suite: PathBuf,
    },
}
