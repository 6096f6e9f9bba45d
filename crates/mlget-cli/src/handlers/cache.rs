//! Cache command handlers.

use anyhow::Result;

use mlget_core::CacheEntry;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_bytes, format_optional, render_table};

const SHORT_HEADERS: &[&str] = &["size", "file_path"];
const LONG_HEADERS: &[&str] = &[
    "id",
    "file_path",
    "pkg_name",
    "pkg_version",
    "size",
    "last_used_at",
];

/// Execute `cache list`.
pub async fn list(ctx: &CliContext, long: bool, json: bool) -> Result<()> {
    let entries = ctx
        .app()
        .status()
        .list_cache_entries()
        .await
        .map_err(CliError::from)?;

    if json {
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }

    let (headers, rows) = cache_table(&entries, long);
    print!("{}", render_table(headers, &rows));
    Ok(())
}

fn cache_table(entries: &[CacheEntry], long: bool) -> (&'static [&'static str], Vec<Vec<String>>) {
    if long {
        let rows = entries
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.file_path.display().to_string(),
                    format_optional(e.pkg_name.as_ref(), "--"),
                    format_optional(e.pkg_version.as_ref(), "--"),
                    e.size.to_string(),
                    e.last_used_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]
            })
            .collect();
        (LONG_HEADERS, rows)
    } else {
        let rows = entries
            .iter()
            .map(|e| vec![format_bytes(e.size), e.file_path.display().to_string()])
            .collect();
        (SHORT_HEADERS, rows)
    }
}
