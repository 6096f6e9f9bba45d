//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use mlget_core::MlgetPaths;

/// Execute the paths command.
///
/// Prints every location mlget uses in `key = value` format. Nothing is
/// created on disk.
pub fn execute(paths: &MlgetPaths) {
    println!("{}", render(paths));
}

fn render(paths: &MlgetPaths) -> String {
    paths.to_string()
}
