//! Command-line interface for ttts.

use clap::Parser;
use std::path::PathBuf;

/// ttts - tic-tac-toe session server
#[derive(Parser, Debug)]
#[command(name = "ttts")]
#[command(about = "Plays tic-tac-toe against TCP clients", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TCP port to accept clients on
    pub port: u16,

    /// Optional TOML file overriding the default settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
