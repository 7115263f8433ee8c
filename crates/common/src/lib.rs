//! Hypescan Common Utilities
//!
//! Shared infrastructure for all Hypescan crates:
//! - Error types and result aliases
//! - `h:mm:ss` timecode parsing and formatting
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
