//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

use mlget_core::domain::DEFAULT_CONNECTIONS;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a package into the cache (or a directory of your choice)
    ///
    /// Example: mlget install torch==2.1.0+cu121
    Install {
        /// Package spec: URL, local path, archive name, or a torch spec
        package_spec: String,
        /// Number of connections per download (aria2c split)
        #[arg(short = 'w', long, default_value_t = DEFAULT_CONNECTIONS)]
        workers: u32,
        /// Output directory (defaults to the mlget cache dir)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Extra arguments passed to aria2c before the built-in ones
        #[arg(last = true)]
        aria2_args: Vec<String>,
    },

    /// Show current and recent download status
    Status {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Cache management commands
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Show resolved paths for all mlget directories
    Paths,
}

/// `mlget cache ...`
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached files
    List {
        /// Show detailed info
        #[arg(long)]
        long: bool,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}
