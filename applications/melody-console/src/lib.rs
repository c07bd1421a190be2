//! Melody console
//!
//! Drives per-guild playback sessions from chat-style command lines. Ships
//! a catalog-backed resolver and a simulated voice backend so the whole
//! pipeline runs without a chat platform.
//!
//! This library exposes the components for testing purposes.

pub mod backend;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use backend::{SimulatedBackend, SimulatedBackendFactory};
pub use catalog::{CatalogEntry, CatalogResolver};
pub use commands::{render_event, Command, Console};
pub use config::MelodyConfig;
pub use error::{ConsoleError, ParseError, Result};
