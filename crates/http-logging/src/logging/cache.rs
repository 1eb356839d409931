//! Per-caller logger cache
//!
//! Maps a caller identifier to its `ClientLogger`. When an insert would
//! exceed the capacity the whole map is cleared first. This is a deliberate
//! simplification rather than LRU eviction: losing cached loggers only costs
//! a re-creation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{ClientLogger, LogSink};
use crate::foundation::DEFAULT_LOGGER_CACHE_CAPACITY;

/// Bounded, thread-safe cache of loggers keyed by caller identifier.
///
/// Lookups take a read lock. Creation, the overflow clear and the insert that
/// follows it run under one write lock, so a concurrent reader never sees a
/// half-cleared map. A logger created by one caller can be dropped by another
/// caller's overflow clear; the next lookup simply creates it again.
///
/// Loggers are created with the sink passed to the first lookup for a name.
#[derive(Debug)]
pub struct LoggerCache {
    loggers: RwLock<HashMap<String, Arc<ClientLogger>>>,
    capacity: usize,
}

impl LoggerCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOGGER_CACHE_CAPACITY)
    }

    /// Cache holding at most `capacity` loggers (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_create(&self, name: &str, sink: &Arc<dyn LogSink>) -> Arc<ClientLogger> {
        if let Some(logger) = self.loggers.read().get(name) {
            return logger.clone();
        }

        let mut loggers = self.loggers.write();
        if let Some(logger) = loggers.get(name) {
            return logger.clone();
        }

        if loggers.len() >= self.capacity {
            tracing::debug!(
                target: "http_logging::cache",
                capacity = self.capacity,
                "Logger cache full, clearing"
            );
            loggers.clear();
        }

        let logger = Arc::new(ClientLogger::new(name, sink.clone()));
        loggers.insert(name.to_string(), logger.clone());
        logger
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.loggers.write().clear();
    }
}

impl Default for LoggerCache {
    fn default() -> Self {
        Self::new()
    }
}
