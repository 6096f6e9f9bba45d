//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They don't know about concrete implementations.

mod app_core;
mod install;
mod status;

pub use app_core::AppCore;
pub use install::{
    CacheRegistration, InstallOutcome, InstallRequest, InstallService, TransferStrategies,
    preferred_strategy,
};
pub use status::StatusService;
