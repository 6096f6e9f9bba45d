//! Status command handler.
//!
//! Lists recorded downloads, most recent first.

use anyhow::Result;

use mlget_core::DownloadTask;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::render_table;

const HEADERS: [&str; 6] = ["id", "url", "out_path", "status", "created_at", "updated_at"];

/// Execute the status command.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let tasks = ctx
        .app()
        .status()
        .list_tasks()
        .await
        .map_err(CliError::from)?;

    if json {
        println!("{}", serde_json::to_string(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No downloads recorded.");
        return Ok(());
    }

    print!("{}", render_table(&HEADERS, &task_rows(&tasks)));
    Ok(())
}

fn task_rows(tasks: &[DownloadTask]) -> Vec<Vec<String>> {
    tasks
        .iter()
        .map(|task| {
            vec![
                task.id.to_string(),
                task.url.clone(),
                task.out_path.display().to_string(),
                task.status.to_string(),
                task.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                task.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect()
}
