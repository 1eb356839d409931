//! Logging policy configuration

use std::collections::HashSet;
use std::sync::Arc;

use http::HeaderName;
use serde::Deserialize;

use super::redaction::RedactionSet;
use super::request_logger::{DefaultHttpRequestLogger, HttpRequestLogger};
use super::response_logger::{DefaultHttpResponseLogger, HttpResponseLogger};
use crate::errors::{PipelineError, PipelineResult};
use crate::logging::{LogDetailLevel, LogLevel};
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Headers whose values are logged unless configured otherwise
pub const DEFAULT_ALLOWED_HEADER_NAMES: &[&str] = &[
    "traceparent",
    "accept",
    "cache-control",
    "connection",
    "content-length",
    "content-type",
    "date",
    "etag",
    "expires",
    "if-match",
    "if-modified-since",
    "if-none-match",
    "if-unmodified-since",
    "last-modified",
    "pragma",
    "request-id",
    "retry-after",
    "server",
    "transfer-encoding",
    "user-agent",
    "www-authenticate",
    "x-request-id",
    "x-correlation-id",
];

/// Query parameters whose values are logged unless configured otherwise
pub const DEFAULT_ALLOWED_QUERY_PARAM_NAMES: &[&str] = &["api-version"];

/// Configuration for the HTTP logging policy.
///
/// Deserializable for the level, allow-lists and pretty printing; logger
/// overrides can only be set in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub level: LogDetailLevel,
    /// Header names whose values are logged (case-insensitive)
    pub allowed_header_names: HashSet<String>,
    /// Query parameter names whose values are logged (case-insensitive)
    pub allowed_query_param_names: HashSet<String>,
    /// Re-indent JSON bodies before logging them
    pub pretty_print_body: bool,
    #[serde(skip)]
    pub request_logger: Option<Arc<dyn HttpRequestLogger>>,
    #[serde(skip)]
    pub response_logger: Option<Arc<dyn HttpResponseLogger>>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: LogDetailLevel::None,
            allowed_header_names: DEFAULT_ALLOWED_HEADER_NAMES.iter().map(|s| s.to_string()).collect(),
            allowed_query_param_names: DEFAULT_ALLOWED_QUERY_PARAM_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pretty_print_body: false,
            request_logger: None,
            response_logger: None,
        }
    }
}

impl LoggingOptions {
    pub fn new(level: LogDetailLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Defaults with the level taken from `HTTP_LOG_DETAIL_LEVEL`
    pub fn from_env() -> Self {
        Self::new(LogDetailLevel::from_env())
    }

    pub fn with_level(mut self, level: LogDetailLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_allowed_header_name<S: Into<String>>(mut self, name: S) -> Self {
        self.allowed_header_names.insert(name.into());
        self
    }

    /// Replace the header allow-list
    pub fn with_allowed_header_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_header_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_query_param_name<S: Into<String>>(mut self, name: S) -> Self {
        self.allowed_query_param_names.insert(name.into());
        self
    }

    /// Replace the query parameter allow-list
    pub fn with_allowed_query_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_query_param_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pretty_print_body(mut self, enabled: bool) -> Self {
        self.pretty_print_body = enabled;
        self
    }

    pub fn with_request_logger<L: HttpRequestLogger + 'static>(mut self, logger: L) -> Self {
        self.request_logger = Some(Arc::new(logger));
        self
    }

    pub fn with_response_logger<L: HttpResponseLogger + 'static>(mut self, logger: L) -> Self {
        self.response_logger = Some(Arc::new(logger));
        self
    }

    /// Use the default request logger with a custom severity
    pub fn with_request_level_selector<F>(self, selector: F) -> Self
    where
        F: Fn(&HttpRequest) -> LogLevel + Send + Sync + 'static,
    {
        self.with_request_logger(DefaultHttpRequestLogger::new().with_level_selector(selector))
    }

    /// Use the default response logger with a custom severity
    pub fn with_response_level_selector<F>(self, selector: F) -> Self
    where
        F: Fn(&dyn HttpResponse) -> LogLevel + Send + Sync + 'static,
    {
        self.with_response_logger(DefaultHttpResponseLogger::new().with_level_selector(selector))
    }

    /// Reject allow-list entries that can never match
    pub fn validate(&self) -> PipelineResult<()> {
        for name in &self.allowed_header_names {
            if name.trim().is_empty() {
                return Err(PipelineError::config("Allowed header names must not be empty"));
            }
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| PipelineError::config(format!("Invalid allowed header name: {:?}", name)))?;
        }

        for name in &self.allowed_query_param_names {
            if name.trim().is_empty() {
                return Err(PipelineError::config("Allowed query parameter names must not be empty"));
            }
            if name.chars().any(|c| matches!(c, '&' | '=' | '#') || c.is_whitespace()) {
                return Err(PipelineError::config(format!(
                    "Invalid allowed query parameter name: {:?}",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Validated, immutable view of the options used while logging
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: LogDetailLevel,
    pub headers: RedactionSet,
    pub query_params: RedactionSet,
    pub pretty_print_body: bool,
}

impl LogSettings {
    pub fn from_options(options: &LoggingOptions) -> PipelineResult<Self> {
        options.validate()?;
        Ok(Self {
            level: options.level,
            headers: RedactionSet::new(&options.allowed_header_names),
            query_params: RedactionSet::new(&options.allowed_query_param_names),
            pretty_print_body: options.pretty_print_body,
        })
    }
}
