//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, artifact and submission loading)
//! - `analyze` - Single submission analysis and prompt preview
//! - `batch` - CSV batch scoring
//! - `artifacts` - Artifact check and vocabulary listing
//! - `serve` - Web server command

pub mod analyze;
pub mod artifacts;
pub mod batch;
pub mod core;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use artifacts::*;
pub use batch::*;
pub use core::*;
pub use serve::*;

