//! Default configuration values, referenced from `#[serde(default = ...)]`.

use std::path::PathBuf;

use super::types::{LoggingConfig, SubcompositorConfig};

/// Nesting limit for subsurface trees, counted in parent links from the root.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 32;

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// `"info"`.
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// `"text"`.
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_subcompositor_config() -> SubcompositorConfig {
    SubcompositorConfig {
        max_tree_depth: default_max_tree_depth(),
    }
}

pub(super) fn default_max_tree_depth() -> usize {
    DEFAULT_MAX_TREE_DEPTH
}
