#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod system;

// Re-export platform probe implementation
pub use system::DefaultPlatformProbe;
