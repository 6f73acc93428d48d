//! Configuration of the subcompositor.
//!
//! - [`types`]: the schema, [`CompositorConfig`] and its sections.
//! - [`defaults`]: serde default functions for missing keys.
//! - [`loader`]: [`ConfigLoader`], reading TOML and validating the result.
//!
//! A missing configuration file is not an error: every key has a default, so
//! an empty document yields [`CompositorConfig::default`].

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CompositorConfig, LoggingConfig, SubcompositorConfig};
