//! Configuration persistence
//!
//! Loads the node configuration and the report counter from flash,
//! falling back to defaults when flash is empty.

pub mod loader;

pub use loader::{ConfigError, ConfigStore};
