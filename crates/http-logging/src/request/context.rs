//! Per-call data shared between pipeline stages

use std::collections::HashMap;

use serde_json::Value;

use crate::foundation::{CALLER_METHOD_KEY, RETRY_COUNT_KEY};

/// Key/value data travelling with a single logical call.
///
/// Upstream stages (retry, REST dispatch) annotate the call here; the
/// logging policy only reads it.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    data: HashMap<String, Value>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.set_data(key, value);
        self
    }

    pub fn set_data<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.data.insert(key.into(), value.into());
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn with_retry_count(self, retry_count: u32) -> Self {
        self.with_data(RETRY_COUNT_KEY, retry_count)
    }

    pub fn with_caller_method<S: Into<String>>(self, caller: S) -> Self {
        self.with_data(CALLER_METHOD_KEY, caller.into())
    }

    /// Retry attempt set by upstream retry logic, numeric or numeric string
    pub fn retry_count(&self) -> Option<u32> {
        match self.get_data(RETRY_COUNT_KEY)? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Identifier of the API method that issued the call
    pub fn caller_method(&self) -> Option<&str> {
        self.get_data(CALLER_METHOD_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}
