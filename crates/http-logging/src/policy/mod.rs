//! # HTTP logging policy
//!
//! Redaction, body gating and the request/response loggers behind
//! [`HttpLoggingPolicy`].

pub mod body_gate;
pub mod http_logging;
pub mod options;
pub mod redaction;
pub mod request_logger;
pub mod response_logger;

pub use body_gate::{content_length, format_body, should_log_body};
pub use http_logging::HttpLoggingPolicy;
pub use options::{LogSettings, LoggingOptions, DEFAULT_ALLOWED_HEADER_NAMES, DEFAULT_ALLOWED_QUERY_PARAM_NAMES};
pub use redaction::{redact_headers, redact_url, RedactionSet};
pub use request_logger::{DefaultHttpRequestLogger, HttpRequestLogger, RequestLevelSelector};
pub use response_logger::{
    DefaultHttpResponseLogger, HttpResponseLogger, LoggingHttpResponse, ResponseLevelSelector,
};
