//! Request logging

use std::fmt;
use std::sync::Arc;

use super::body_gate::{content_length, format_body, should_log_body};
use super::options::LogSettings;
use super::redaction::{redact_headers, redact_url};
use crate::errors::PipelineResult;
use crate::foundation::{
    BoxFuture, BODY_KEY, CONTENT_LENGTH_KEY, METHOD_KEY, REQUEST_LOG_MESSAGE, TRY_COUNT_KEY, URL_KEY,
};
use crate::logging::{ClientLogger, LogLevel, LoggingContext};
use crate::request::HttpRequest;

/// Severity override for requests
pub type RequestLevelSelector = Arc<dyn Fn(&HttpRequest) -> LogLevel + Send + Sync>;

/// Pluggable request logging behavior
pub trait HttpRequestLogger: Send + Sync + fmt::Debug {
    /// Severity the request is logged at
    fn log_level(&self, _request: &HttpRequest, _context: &LoggingContext) -> LogLevel {
        LogLevel::Informational
    }

    /// Emit the request record.
    ///
    /// The request may be modified (a single-pass body replaced by a buffer)
    /// but must still carry the same bytes afterwards.
    fn log_request<'a>(
        &'a self,
        logger: &'a ClientLogger,
        request: &'a mut HttpRequest,
        settings: &'a LogSettings,
        context: &'a LoggingContext,
        level: LogLevel,
    ) -> BoxFuture<'a, PipelineResult<()>>;
}

/// Standard request logger
#[derive(Clone, Default)]
pub struct DefaultHttpRequestLogger {
    level_selector: Option<RequestLevelSelector>,
}

impl DefaultHttpRequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&HttpRequest) -> LogLevel + Send + Sync + 'static,
    {
        self.level_selector = Some(Arc::new(selector));
        self
    }
}

impl fmt::Debug for DefaultHttpRequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultHttpRequestLogger")
            .field("level_selector", &self.level_selector.is_some())
            .finish()
    }
}

impl HttpRequestLogger for DefaultHttpRequestLogger {
    fn log_level(&self, request: &HttpRequest, _context: &LoggingContext) -> LogLevel {
        match &self.level_selector {
            Some(selector) => selector(request),
            None => LogLevel::Informational,
        }
    }

    fn log_request<'a>(
        &'a self,
        logger: &'a ClientLogger,
        request: &'a mut HttpRequest,
        settings: &'a LogSettings,
        context: &'a LoggingContext,
        level: LogLevel,
    ) -> BoxFuture<'a, PipelineResult<()>> {
        Box::pin(async move {
            let mut record = logger.at(level);
            if !record.is_enabled() {
                return Ok(());
            }

            if settings.level.should_log_url() {
                record = record
                    .field(METHOD_KEY, request.method.as_str())
                    .field(URL_KEY, redact_url(&request.url, &settings.query_params))
                    .field_opt(TRY_COUNT_KEY, context.retry_count());
            }

            if settings.level.should_log_headers() && logger.can_log(LogLevel::Informational) {
                record = record.fields(redact_headers(&request.headers, &settings.headers));
            }

            if request.body.is_empty() {
                record.field(CONTENT_LENGTH_KEY, 0).emit(REQUEST_LOG_MESSAGE);
                return Ok(());
            }

            let content_type = request.content_type();
            let length = if request.has_content_length() {
                content_length(logger, &request.headers)
            } else {
                request.body.known_length().unwrap_or(0)
            };
            record = record.field(CONTENT_LENGTH_KEY, length);

            if settings.level.should_log_body() && should_log_body(content_type.as_deref(), length) {
                let body = request.body.buffer().await?;
                record = record.field(
                    BODY_KEY,
                    format_body(content_type.as_deref(), &body, settings.pretty_print_body),
                );
            }

            record.emit(REQUEST_LOG_MESSAGE);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogDetailLevel;
    use crate::policy::options::LoggingOptions;
    use crate::request::{PipelineContext, RequestBody};
    use crate::testing::RecordingSink;
    use bytes::Bytes;
    use http::Method;

    fn settings(level: LogDetailLevel) -> LogSettings {
        LogSettings::from_options(&LoggingOptions::new(level).with_allowed_query_param_names(["b"]))
            .unwrap()
    }

    fn logger(sink: &RecordingSink) -> ClientLogger {
        ClientLogger::new("tests::request", Arc::new(sink.clone()))
    }

    #[tokio::test]
    async fn test_basic_request_without_body() {
        let sink = RecordingSink::new();
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::GET, "https://host/anything?a=secret&b=5")
            .unwrap()
            .with_header("authorization", "Bearer secret")
            .unwrap();
        let context = LoggingContext::from_pipeline(&PipelineContext::new().with_retry_count(1));

        DefaultHttpRequestLogger::new()
            .log_request(&logger, &mut request, &settings(LogDetailLevel::Basic), &context, LogLevel::Informational)
            .await
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.message, "HTTP request");
        assert_eq!(record.field_str("method"), Some("GET"));
        assert_eq!(record.field_str("url"), Some("https://host/anything?a=REDACTED&b=5"));
        assert_eq!(record.field("tryCount"), Some(&serde_json::json!(1)));
        assert_eq!(record.field("contentLength"), Some(&serde_json::json!(0)));
        assert!(record.field("authorization").is_none());
    }

    #[tokio::test]
    async fn test_headers_are_redacted() {
        let sink = RecordingSink::new();
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::GET, "https://host/")
            .unwrap()
            .with_header("Authorization", "Bearer secret")
            .unwrap()
            .with_header("User-Agent", "tests/1.0")
            .unwrap();
        let context = LoggingContext::new("tests");

        DefaultHttpRequestLogger::new()
            .log_request(&logger, &mut request, &settings(LogDetailLevel::Headers), &context, LogLevel::Informational)
            .await
            .unwrap();

        let record = &sink.records()[0];
        assert_eq!(record.field_str("authorization"), Some("REDACTED"));
        assert_eq!(record.field_str("user-agent"), Some("tests/1.0"));
        assert!(record.field("tryCount").is_none());
    }

    #[tokio::test]
    async fn test_stream_body_is_buffered_and_logged() {
        let sink = RecordingSink::new();
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::POST, "https://host/items")
            .unwrap()
            .with_header("content-type", "application/json")
            .unwrap()
            .with_header("content-length", "11")
            .unwrap()
            .with_body(RequestBody::from_chunks(vec![
                Bytes::from_static(b"{\"id\":"),
                Bytes::from_static(b"1234}"),
            ]));
        let context = LoggingContext::new("tests");

        DefaultHttpRequestLogger::new()
            .log_request(
                &logger,
                &mut request,
                &settings(LogDetailLevel::BodyAndHeaders),
                &context,
                LogLevel::Informational,
            )
            .await
            .unwrap();

        let record = &sink.records()[0];
        assert_eq!(record.field_str("body"), Some("{\"id\":1234}"));
        assert_eq!(record.field("contentLength"), Some(&serde_json::json!(11)));

        assert!(request.body.is_replayable());
        let sent = std::mem::take(&mut request.body).into_bytes().await.unwrap();
        assert_eq!(&sent[..], b"{\"id\":1234}");
    }

    #[tokio::test]
    async fn test_gated_body_is_left_alone() {
        let sink = RecordingSink::new();
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::PUT, "https://host/blob")
            .unwrap()
            .with_header("content-type", "application/octet-stream")
            .unwrap()
            .with_body(RequestBody::from_stream(
                futures_util::stream::iter(vec![Ok(Bytes::from_static(b"\x00\x01\x02"))]),
                Some(3),
            ));
        let context = LoggingContext::new("tests");

        DefaultHttpRequestLogger::new()
            .log_request(
                &logger,
                &mut request,
                &settings(LogDetailLevel::BodyAndHeaders),
                &context,
                LogLevel::Informational,
            )
            .await
            .unwrap();

        let record = &sink.records()[0];
        assert!(record.field("body").is_none());
        assert_eq!(record.field("contentLength"), Some(&serde_json::json!(3)));
        assert!(!request.body.is_replayable());
    }

    #[tokio::test]
    async fn test_level_selector_and_disabled_level() {
        let sink = RecordingSink::with_min_level(LogLevel::Warning);
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::DELETE, "https://host/item").unwrap();
        let context = LoggingContext::new("tests");

        let request_logger = DefaultHttpRequestLogger::new().with_level_selector(|request| {
            if request.method == Method::DELETE {
                LogLevel::Warning
            } else {
                LogLevel::Informational
            }
        });
        let level = request_logger.log_level(&request, &context);
        assert_eq!(level, LogLevel::Warning);

        request_logger
            .log_request(&logger, &mut request, &settings(LogDetailLevel::Basic), &context, level)
            .await
            .unwrap();
        request_logger
            .log_request(
                &logger,
                &mut request,
                &settings(LogDetailLevel::Basic),
                &context,
                LogLevel::Informational,
            )
            .await
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warning);
    }

    #[tokio::test]
    async fn test_headers_skipped_when_informational_disabled() {
        let sink = RecordingSink::with_min_level(LogLevel::Warning);
        let logger = logger(&sink);
        let mut request = HttpRequest::parse(Method::POST, "https://host/items")
            .unwrap()
            .with_header("authorization", "Bearer secret")
            .unwrap()
            .with_header("user-agent", "tests/1.0")
            .unwrap();
        let context = LoggingContext::new("tests");
        let request_logger = DefaultHttpRequestLogger::new().with_level_selector(|_| LogLevel::Warning);

        let level = request_logger.log_level(&request, &context);
        request_logger
            .log_request(&logger, &mut request, &settings(LogDetailLevel::Headers), &context, level)
            .await
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let mut keys: Vec<_> = records[0].fields.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["contentLength", "method", "url"]);
    }
}
