//! # http-logging
//!
//! Logging policy for an HTTP client pipeline.
//!
//! This crate provides:
//! - A handle(request, next) policy chain ending in a pluggable transport
//! - Request, response and failure records at a configurable detail level
//! - Allow-list redaction of header values and query parameter values
//! - Deferred response body logging that still lets the caller read the body
//! - Per-caller loggers shared through a bounded cache

// Core modules
pub mod errors;
pub mod foundation;
pub mod logging;
pub mod pipeline;
pub mod policy;
pub mod request;
pub mod response;
pub mod testing;

pub use errors::{PipelineError, PipelineResult, SinkError};
pub use foundation::BoxFuture;

// Re-export logging types
pub use logging::{
    init_logging, ClientLogger, LogDetailLevel, LogLevel, LogRecord, LogSink, LoggerCache, LoggingContext,
    TracingConfig, TracingSink,
};

// Re-export pipeline types
pub use pipeline::{HttpPipeline, Next, NextFuture, PipelinePolicy, Transport};

// Re-export policy types
pub use policy::{
    DefaultHttpRequestLogger, DefaultHttpResponseLogger, HttpLoggingPolicy, HttpRequestLogger, HttpResponseLogger,
    LoggingHttpResponse, LoggingOptions, RedactionSet,
};

pub use request::{HttpRequest, PipelineContext, RequestBody, RequestHead};
pub use response::{HttpResponse, StreamingResponse};
