//! Error types for the Braitenberg vehicle crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised when building a motion model
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid wheel radius {0}: must be positive and finite")]
    InvalidWheelRadius(f64),

    #[error("invalid wheel base {0}: must be positive and finite")]
    InvalidWheelBase(f64),
}

/// Errors raised by the message transport
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("velocity channel closed")]
    Closed,

    #[error("failed to publish: {0}")]
    Publish(String),
}
