//! Table formatting utilities for CLI output.

/// Render rows under a header as left-aligned columns separated by two
/// spaces, with a dashed rule under the header.
///
/// Column widths fit the widest cell. Rows shorter than the header are
/// padded with empty cells.
///
/// # Examples
///
/// ```rust
/// use mlget_cli::presentation::render_table;
///
/// let out = render_table(&["id", "status"], &[vec!["1".into(), "completed".into()]]);
/// assert_eq!(out, "id  status\n-------------\n1   completed\n");
/// ```
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let header_line = pad_cells(headers.iter().copied(), &widths);

    let mut out = String::new();
    out.push_str(header_line.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(header_line.len()));
    out.push('\n');
    for row in rows {
        let cells = (0..headers.len()).map(|i| row.get(i).map_or("", String::as_str));
        out.push_str(pad_cells(cells, &widths).trim_end());
        out.push('\n');
    }
    out
}

fn pad_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Human-readable byte count (`1.5 MiB`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Format an optional value for table display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<&T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), ToString::to_string)
}
