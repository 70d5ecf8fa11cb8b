//! Core orchestration logic.
//!
//! This module contains:
//! - BatchDriver: One run from pending table to snapshot

pub mod driver;

// Re-export commonly used types
pub use driver::{snapshot_message, BatchDriver, EngineStatus};
