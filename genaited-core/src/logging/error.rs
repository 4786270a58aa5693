//! Logging error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("unknown log level: {0}")]
    UnknownLevel(String),
}
