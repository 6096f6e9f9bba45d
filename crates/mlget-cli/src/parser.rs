//! Root CLI parser and global options.

use clap::Parser;

use crate::commands::Commands;

/// mlget: ML package fetcher with resumable, multi-connection downloads.
#[derive(Parser, Debug)]
#[command(name = "mlget")]
#[command(about = "ML package manager with resumable downloads")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
