//! CLI argument definitions.

use clap::Parser;

use crate::commands::Commands;

/// Inspect, edit and seed portfolio content.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version = env!("FOLIO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Store to use: `firestore`, a file:// URL, or a directory path
    #[arg(long, env = "FOLIO_STORE", global = true)]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
