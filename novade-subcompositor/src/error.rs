//! Error types for the NovaDE subcompositor.
//!
//! Tree operations report [`SubsurfaceError`]. Every variant is local and
//! non-fatal: the request that produced it has not mutated anything, and the
//! protocol binding decides whether the offending client gets disconnected.
//!
//! [`ConfigError`] and [`LoggingError`] cover the ambient configuration and
//! logging setup, in the same shape as the rest of the NovaDE crates.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::surface::SurfaceId;

/// Errors raised by surface, subsurface and stacking operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubsurfaceError {
    /// The surface already carries a role, or carries a different kind of role
    /// than the one requested.
    #[error("{surface} already has a role")]
    InvalidRole { surface: SurfaceId },

    /// The requested parent is the surface itself or one of its descendants.
    #[error("{parent} cannot become the parent of {surface}: the surface tree would contain a cycle")]
    InvalidHierarchy { surface: SurfaceId, parent: SurfaceId },

    /// A stacking reference is neither a sibling of the surface nor its parent.
    #[error("{sibling} is neither a sibling nor the parent of {surface}")]
    InvalidSibling { surface: SurfaceId, sibling: SurfaceId },

    /// The surface id does not name a live surface.
    #[error("{0} does not exist")]
    UnknownSurface(SurfaceId),

    /// The operation needs an attached subsurface role.
    #[error("{0} is not a subsurface")]
    NotASubsurface(SurfaceId),

    /// `wl_surface.set_buffer_scale` with a non-positive scale.
    #[error("invalid buffer scale {scale} for {surface}")]
    InvalidScale { surface: SurfaceId, scale: i32 },

    /// The committed buffer size is not a multiple of the buffer scale.
    #[error("buffer of {width}x{height} is not divisible by scale {scale} on {surface}")]
    InvalidBufferSize {
        surface: SurfaceId,
        width: u32,
        height: u32,
        scale: i32,
    },

    /// Attaching the subsurface would nest the tree deeper than configured.
    #[error("subsurface tree would exceed the maximum depth of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A thread panicked while holding the surface tree lock.
    #[error("surface tree lock poisoned")]
    LockPoisoned,
}

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration parsed but contains values outside their domain.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Errors raised while installing the global `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Logging I/O error: {0}")]
    Io(#[from] io::Error),
}
