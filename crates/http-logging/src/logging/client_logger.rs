//! Named logger handing records to a sink

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use super::{LogLevel, LogRecord, LogSink};

/// Logger bound to one caller identity.
///
/// Sink failures are swallowed; the first one per logger is reported
/// through `tracing` at debug level.
pub struct ClientLogger {
    name: String,
    sink: Arc<dyn LogSink>,
    sink_failure_reported: AtomicBool,
}

impl ClientLogger {
    pub fn new<S: Into<String>>(name: S, sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            sink,
            sink_failure_reported: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_log(&self, level: LogLevel) -> bool {
        self.sink.is_enabled(&self.name, level)
    }

    /// Start a record at `level`. Fields added to a disabled builder are dropped.
    pub fn at(&self, level: LogLevel) -> LogRecordBuilder<'_> {
        LogRecordBuilder {
            logger: self,
            level,
            enabled: self.can_log(level),
            fields: Map::new(),
        }
    }

    fn deliver(&self, record: LogRecord) {
        if let Err(e) = self.sink.emit(&record) {
            if !self.sink_failure_reported.swap(true, Ordering::AcqRel) {
                tracing::debug!(
                    target: "http_logging::sink",
                    logger = %self.name,
                    error = %e,
                    "Log sink failed; further failures for this logger are suppressed"
                );
            }
        }
    }
}

impl fmt::Debug for ClientLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientLogger")
            .field("name", &self.name)
            .field("sink", &self.sink)
            .finish()
    }
}

/// Collects the fields of one record and emits them in a single call
#[must_use = "a record is only logged when `emit` is called"]
pub struct LogRecordBuilder<'a> {
    logger: &'a ClientLogger,
    level: LogLevel,
    enabled: bool,
    fields: Map<String, Value>,
}

impl<'a> LogRecordBuilder<'a> {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        if self.enabled {
            self.fields.insert(key.into(), value.into());
        }
        self
    }

    pub fn field_opt<K, V>(self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    pub fn fields(mut self, fields: Map<String, Value>) -> Self {
        if self.enabled {
            self.fields.extend(fields);
        }
        self
    }

    pub fn emit(self, message: &str) {
        if !self.enabled {
            return;
        }
        self.logger.deliver(LogRecord {
            logger: self.logger.name.clone(),
            level: self.level,
            message: message.to_string(),
            fields: self.fields,
            timestamp: Utc::now(),
        });
    }
}
