//! Runtime error types

use gazeform_core::GazeformError;
use thiserror::Error;

/// Errors raised while configuring or bringing up a tracking module
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Calibration tables rejected: {0}")]
    Calibration(#[from] GazeformError),

    #[error("Invalid module configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid duration: {0}")]
    Duration(#[from] humantime::DurationError),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("A global logger is already installed")]
    LoggingAlreadyInitialized,
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
