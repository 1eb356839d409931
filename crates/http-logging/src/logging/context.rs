//! Per-call logging context

use std::time::{Duration, Instant};

use crate::foundation::DEFAULT_LOGGER_NAME;
use crate::request::PipelineContext;

/// Built fresh for every call that gets logged and dropped once logging
/// completes. A retried call keeps its caller identity and carries the
/// incremented retry count set by the retry stage.
#[derive(Debug, Clone)]
pub struct LoggingContext {
    caller: String,
    retry_count: Option<u32>,
    started_at: Instant,
}

impl LoggingContext {
    pub fn new<S: Into<String>>(caller: S) -> Self {
        Self {
            caller: caller.into(),
            retry_count: None,
            started_at: Instant::now(),
        }
    }

    pub fn from_pipeline(context: &PipelineContext) -> Self {
        Self {
            caller: context
                .caller_method()
                .unwrap_or(DEFAULT_LOGGER_NAME)
                .to_string(),
            retry_count: context.retry_count(),
            started_at: Instant::now(),
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn retry_count(&self) -> Option<u32> {
        self.retry_count
    }

    /// Restart the clock, right before the request goes downstream
    pub fn mark_sent(&mut self) {
        self.started_at = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
