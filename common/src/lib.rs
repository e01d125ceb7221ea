//! Shared models and plumbing for the scopr workspace.
//!
//! Everything that more than one crate needs lives here: the scope data model
//! ([`network`]), run configuration ([`config`]), token extraction and file
//! persistence helpers ([`utils`]) and the logging macros.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod utils;

pub use tracing;
