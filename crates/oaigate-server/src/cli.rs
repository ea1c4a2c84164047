//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// OAI-PMH gateway in front of record storage.
#[derive(Parser, Debug)]
#[command(name = "oaigate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "oaigate.toml")]
    pub config: PathBuf,

    /// Listen address, overriding `server.bind`
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
