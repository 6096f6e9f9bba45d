//! Transfer Engine strategies.
//!
//! Both implement [`mlget_core::TransferPort`]; the install orchestrator picks
//! one per attempt.

mod aria2;
mod stream;

pub use aria2::{ACCELERATOR_EXECUTABLE, Aria2Transfer};
pub use stream::{CHUNK_SIZE, StreamTransfer};
