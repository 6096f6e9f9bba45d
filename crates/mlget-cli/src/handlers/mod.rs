//! Command handlers that delegate to `AppCore`.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call `AppCore` methods
//!   3. Format output for the terminal
//!
//! Handlers should NOT access repositories directly or contain business logic.

pub mod cache;
pub mod install;
pub mod paths;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;
