//! Configuration schema.
//!
//! All structs reject unknown keys and fill missing ones from
//! [`super::defaults`].

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;

/// Root of `subcompositor.toml`.
///
/// ```
/// use novade_subcompositor::config::CompositorConfig;
///
/// let config: CompositorConfig = toml::from_str(
///     r#"
///     [logging]
///     level = "debug"
///
///     [subcompositor]
///     max_tree_depth = 8
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.logging.level, "debug");
/// assert_eq!(config.logging.format, "text");
/// assert_eq!(config.subcompositor.max_tree_depth, 8);
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CompositorConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_subcompositor_config")]
    pub subcompositor: SubcompositorConfig,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            subcompositor: defaults::default_subcompositor_config(),
        }
    }
}

/// Settings for [`crate::logging::init_logging`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. `None` logs to stdout only.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Limits applied by [`crate::subcompositor::Subcompositor`].
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SubcompositorConfig {
    /// Maximum number of parent links between a subsurface and its root.
    #[serde(default = "defaults::default_max_tree_depth")]
    pub max_tree_depth: usize,
}

impl Default for SubcompositorConfig {
    fn default() -> Self {
        defaults::default_subcompositor_config()
    }
}
