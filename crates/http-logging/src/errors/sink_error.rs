use thiserror::Error;

/// Failure reported by a log sink. Never propagated into the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("log sink failed: {message}")]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
        }
    }
}
