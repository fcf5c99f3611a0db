//! # pylons-rs-core
//!
//! Core types for the pylons-rs framework. This crate has no framework
//! dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error type and result alias
//! - [`settings`] - The flat settings mapping consumed by configuration code
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{PylonsError, PylonsResult};
pub use settings::Settings;
