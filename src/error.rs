/*
 * Error Module
 *
 * Errors surfaced by the flock core. The simulation itself is closed and
 * total, so the only failures are a rejected configuration or a config
 * file that could not be read or parsed.
 */

use std::path::PathBuf;
use thiserror::Error;

/// A configuration value that would produce degenerate geometry or motion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("min_speed ({min}) exceeds max_speed ({max})")]
    SpeedRange { min: f64, max: f64 },

    #[error("view_proportion must lie in (0, 1], got {0}")]
    ViewProportion(f64),

    #[error("tick_interval_ms must be at least 1")]
    ZeroTickInterval,
}

/// Top-level error for constructing a simulation or loading its settings.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlockError>;
