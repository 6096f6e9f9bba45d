#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

pub mod index;
pub mod resolver;
pub mod transfer;

pub use index::PipIndexDownloader;
pub use resolver::{SpecResolver, detect_toolkit_version};
pub use transfer::{Aria2Transfer, StreamTransfer};

