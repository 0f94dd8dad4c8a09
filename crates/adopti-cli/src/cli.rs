//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line client for the Adopti backend.
#[derive(Parser, Debug)]
#[command(name = "adopti")]
#[command(author, version = env!("ADOPTI_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend API base URL, including the /api prefix
    #[arg(
        long,
        env = "ADOPTI_API_URL",
        default_value = "http://localhost:8000/api",
        global = true
    )]
    pub api_url: String,

    /// Public site URL, used for redirects
    #[arg(
        long,
        env = "ADOPTI_SITE_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    pub site_url: String,

    /// Client storage file [default: <data dir>/adopti/storage.json]
    #[arg(long, env = "ADOPTI_STORAGE", global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
