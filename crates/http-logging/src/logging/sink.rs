//! Log records and the sinks that receive them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::LogLevel;
use crate::errors::SinkError;

/// One structured log record: a message plus key/value fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub logger: String,
    pub level: LogLevel,
    pub message: String,
    pub fields: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Backend receiving structured records
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Whether a record at `level` for `logger` would be kept
    fn is_enabled(&self, logger: &str, level: LogLevel) -> bool;

    /// Deliver a record. Errors are swallowed by the caller.
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Forwards records to `tracing`, one event per record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! tracing_event {
    ($level:expr, $record:expr, $fields:expr) => {
        tracing::event!(
            target: "http_logging",
            $level,
            logger = %$record.logger,
            fields = %$fields,
            "{}",
            $record.message
        )
    };
}

impl LogSink for TracingSink {
    fn is_enabled(&self, _logger: &str, level: LogLevel) -> bool {
        match level {
            LogLevel::Verbose => tracing::enabled!(target: "http_logging", tracing::Level::DEBUG),
            LogLevel::Informational => tracing::enabled!(target: "http_logging", tracing::Level::INFO),
            LogLevel::Warning => tracing::enabled!(target: "http_logging", tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(target: "http_logging", tracing::Level::ERROR),
        }
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let fields = serde_json::to_string(&record.fields).map_err(|e| SinkError::new(e.to_string()))?;
        match record.level {
            LogLevel::Verbose => tracing_event!(tracing::Level::DEBUG, record, fields),
            LogLevel::Informational => tracing_event!(tracing::Level::INFO, record, fields),
            LogLevel::Warning => tracing_event!(tracing::Level::WARN, record, fields),
            LogLevel::Error => tracing_event!(tracing::Level::ERROR, record, fields),
        }
        Ok(())
    }
}
