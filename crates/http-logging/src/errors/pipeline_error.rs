//! Pipeline error types
//!
//! Errors surfaced by the pipeline and the logging policy. Downstream
//! failures travel through the policy untouched; logging problems never
//! become a `PipelineError`.

use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors produced by pipeline stages, transports and response bodies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid logging configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Transport failed: {message}")]
    Transport { message: String },

    #[error("Failed to read body: {message}")]
    BodyRead { message: String },

    #[error("Body has already been consumed")]
    BodyConsumed,

    #[error("Internal pipeline error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        PipelineError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request<T: Into<String>>(message: T) -> Self {
        PipelineError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport<T: Into<String>>(message: T) -> Self {
        PipelineError::Transport {
            message: message.into(),
        }
    }

    /// Create a body read error
    pub fn body_read<T: Into<String>>(message: T) -> Self {
        PipelineError::BodyRead {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        PipelineError::Internal {
            message: message.into(),
        }
    }

    /// Stable error code for log records
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineError::InvalidConfig { .. } => "INVALID_CONFIG",
            PipelineError::InvalidRequest { .. } => "INVALID_REQUEST",
            PipelineError::Transport { .. } => "TRANSPORT_FAILED",
            PipelineError::BodyRead { .. } => "BODY_READ_FAILED",
            PipelineError::BodyConsumed => "BODY_CONSUMED",
            PipelineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::BodyRead {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Internal {
            message: format!("JSON serialization error: {}", err),
        }
    }
}
