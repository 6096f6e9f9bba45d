//! CLI entry point - the composition root.
//!
//! Bootstrap wires the infrastructure together; commands are dispatched to
//! handlers which delegate to `AppCore`.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mlget_cli::handlers::install::InstallArgs;
use mlget_cli::{CacheCommand, Cli, CliConfig, Commands, bootstrap, exit_code_for, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_environment()?;

    match command {
        Commands::Install {
            package_spec,
            workers,
            out,
            aria2_args,
        } => {
            let ctx = bootstrap(config).await?;
            let args = InstallArgs {
                package_spec,
                workers,
                out,
                aria2_args,
            };
            handlers::install::execute(&ctx, args).await?;
        }
        Commands::Status { json } => {
            let ctx = bootstrap(config).await?;
            handlers::status::execute(&ctx, json).await?;
        }
        Commands::Cache { command } => {
            let ctx = bootstrap(config).await?;
            match command {
                CacheCommand::List { long, json } => {
                    handlers::cache::list(&ctx, long, json).await?;
                }
            }
        }
        // Paths never touch the store.
        Commands::Paths => handlers::paths::execute(&config.paths),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = u8::try_from(exit_code_for(&err)).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
