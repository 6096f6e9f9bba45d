//! Shared CLI presentation utilities.
//!
//! Format-only: nothing in here talks to the store or makes decisions.

pub mod progress;
pub mod tables;

pub use progress::InstallReporter;
pub use tables::{format_bytes, format_optional, render_table};
