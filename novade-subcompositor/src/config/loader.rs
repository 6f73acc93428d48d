//! Loading and validation of [`CompositorConfig`].

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use super::types::CompositorConfig;
use crate::error::ConfigError;

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses and validates a TOML document.
    pub fn load_from_str(content: &str) -> Result<CompositorConfig, ConfigError> {
        let mut config: CompositorConfig = toml::from_str(content)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Reads `path`. A file that does not exist yields the validated defaults.
    pub fn load_from_path(path: &Path) -> Result<CompositorConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading configuration");
                Self::load_from_str(&content)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                let mut config = CompositorConfig::default();
                Self::validate_config(&mut config)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Normalizes level and format to lowercase and checks every value's domain.
    fn validate_config(config: &mut CompositorConfig) -> Result<(), ConfigError> {
        let level = config.logging.level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )))
            }
        }

        let format = config.logging.format.to_lowercase();
        match format.as_str() {
            "text" | "json" => config.logging.format = format,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )))
            }
        }

        if config.subcompositor.max_tree_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_tree_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
