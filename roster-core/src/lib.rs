//! Roster Core - shared foundation for the Roster admin tools
//!
//! Defines the error, logging, and configuration types used by every
//! Roster crate.

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;
