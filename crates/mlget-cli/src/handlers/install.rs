//! Install command handler.

use std::path::PathBuf;

use anyhow::Result;

use mlget_core::{CacheRegistration, InstallOutcome, InstallRequest};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments of `mlget install`.
#[derive(Debug, Clone)]
pub struct InstallArgs {
    pub package_spec: String,
    pub workers: u32,
    pub out: Option<PathBuf>,
    pub aria2_args: Vec<String>,
}

/// Execute the install command.
///
/// Progress notices are printed by the context's reporter as the install
/// runs. A failed download is reported as `CliError::DownloadFailed`.
pub async fn execute(ctx: &CliContext, args: InstallArgs) -> Result<()> {
    println!("Requested install: {}", args.package_spec);
    println!("Workers: {}", args.workers);

    let outcome = run(ctx, args).await;
    ctx.reporter().finish();
    let outcome = outcome?;

    summarize(&outcome)?;
    Ok(())
}

async fn run(ctx: &CliContext, args: InstallArgs) -> Result<InstallOutcome, CliError> {
    let mut request = InstallRequest::new(args.package_spec)
        .with_connections(args.workers)
        .with_extra_args(args.aria2_args);
    if let Some(out) = args.out {
        request = request.with_destination_dir(out);
    }
    Ok(ctx.app().installs().install(request).await?)
}

fn summarize(outcome: &InstallOutcome) -> Result<(), CliError> {
    if !outcome.is_success() {
        if outcome.result.resumable {
            println!(
                "Partial file kept at {}",
                outcome.result.destination.display()
            );
        }
        return Err(CliError::DownloadFailed(
            outcome.result.diagnostic().to_string(),
        ));
    }

    println!(
        "Download completed: {}",
        outcome.result.destination.display()
    );
    match &outcome.cache {
        Some(CacheRegistration::AlreadyPresent) => println!("Already in cache index."),
        Some(CacheRegistration::Failed(reason)) => {
            eprintln!("Warning: could not record cache entry: {reason}");
        }
        Some(CacheRegistration::Registered(_)) | None => {}
    }
    Ok(())
}
