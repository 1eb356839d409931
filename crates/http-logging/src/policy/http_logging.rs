//! The HTTP logging pipeline policy

use std::sync::Arc;

use super::options::{LogSettings, LoggingOptions};
use super::redaction::redact_url;
use super::request_logger::{DefaultHttpRequestLogger, HttpRequestLogger};
use super::response_logger::{DefaultHttpResponseLogger, HttpResponseLogger};
use crate::errors::PipelineResult;
use crate::foundation::{
    DURATION_MS_KEY, ERROR_CODE_KEY, ERROR_KEY, FAILURE_LOG_MESSAGE, METHOD_KEY, TRY_COUNT_KEY, URL_KEY,
};
use crate::logging::{LogDetailLevel, LogLevel, LogSink, LoggerCache, LoggingContext, TracingSink};
use crate::pipeline::{Next, NextFuture, PipelinePolicy};
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Logs each request, its response and any downstream failure.
///
/// Sits in front of the transport (after retries, so every attempt is
/// logged). Header values and query parameter values outside the configured
/// allow-lists are replaced before anything reaches the sink. At
/// [`LogDetailLevel::BodyAndHeaders`] the response record is deferred until
/// the caller reads the body.
#[derive(Debug, Clone)]
pub struct HttpLoggingPolicy {
    settings: Arc<LogSettings>,
    request_logger: Arc<dyn HttpRequestLogger>,
    response_logger: Arc<dyn HttpResponseLogger>,
    cache: Arc<LoggerCache>,
    sink: Arc<dyn LogSink>,
}

impl HttpLoggingPolicy {
    /// Policy with its own logger cache, writing to `tracing`
    pub fn new(options: LoggingOptions) -> PipelineResult<Self> {
        Self::with_logger_cache(options, Arc::new(LoggerCache::new()))
    }

    /// Policy sharing `cache` with other policies
    pub fn with_logger_cache(options: LoggingOptions, cache: Arc<LoggerCache>) -> PipelineResult<Self> {
        let settings = LogSettings::from_options(&options)?;
        let request_logger = options
            .request_logger
            .unwrap_or_else(|| Arc::new(DefaultHttpRequestLogger::new()));
        let response_logger = options
            .response_logger
            .unwrap_or_else(|| Arc::new(DefaultHttpResponseLogger::new()));

        tracing::debug!(
            target: "http_logging::policy",
            level = %settings.level,
            allowed_headers = settings.headers.len(),
            allowed_query_params = settings.query_params.len(),
            "HTTP logging policy configured"
        );

        Ok(Self {
            settings: Arc::new(settings),
            request_logger,
            response_logger,
            cache,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the sink records are delivered to
    pub fn with_sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn detail_level(&self) -> LogDetailLevel {
        self.settings.level
    }

    pub fn logger_cache(&self) -> &Arc<LoggerCache> {
        &self.cache
    }

    /// Log around the rest of the chain
    pub async fn process(&self, mut request: HttpRequest, next: Next) -> PipelineResult<Box<dyn HttpResponse>> {
        if self.settings.level == LogDetailLevel::None {
            return next.run(request).await;
        }

        let mut context = LoggingContext::from_pipeline(&request.context);
        let logger = self.cache.get_or_create(context.caller(), &self.sink);

        let request_level = self.request_logger.log_level(&request, &context);
        if logger.can_log(request_level) {
            self.request_logger
                .log_request(&logger, &mut request, &self.settings, &context, request_level)
                .await?;
        }

        let method = request.method.clone();
        let url = request.url.clone();

        context.mark_sent();
        let response = match next.run(request).await {
            Ok(response) => response,
            Err(error) => {
                let duration_ms = u64::try_from(context.elapsed().as_millis()).unwrap_or(u64::MAX);
                logger
                    .at(LogLevel::Warning)
                    .field(METHOD_KEY, method.as_str())
                    .field(URL_KEY, redact_url(&url, &self.settings.query_params))
                    .field_opt(TRY_COUNT_KEY, context.retry_count())
                    .field(DURATION_MS_KEY, duration_ms)
                    .field(ERROR_KEY, error.to_string())
                    .field(ERROR_CODE_KEY, error.error_code())
                    .emit(FAILURE_LOG_MESSAGE);
                return Err(error);
            }
        };

        let response_level = self.response_logger.log_level(response.as_ref(), &context);
        if !logger.can_log(response_level) {
            return Ok(response);
        }

        Ok(self
            .response_logger
            .log_response(logger, response, &self.settings, &context, response_level))
    }
}

impl PipelinePolicy for HttpLoggingPolicy {
    fn handle(&self, request: HttpRequest, next: Next) -> NextFuture<'static> {
        let policy = self.clone();
        Box::pin(async move { policy.process(request, next).await })
    }

    fn name(&self) -> &'static str {
        "HttpLoggingPolicy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;
    use crate::foundation::DEFAULT_LOGGER_NAME;
    use crate::pipeline::HttpPipeline;
    use crate::request::PipelineContext;
    use crate::testing::{response_addr, MockTransport, RecordingSink, ResponseTemplate};
    use http::{Method, StatusCode};
    use serde_json::json;

    fn pipeline(level: LogDetailLevel, transport: MockTransport, sink: &RecordingSink) -> HttpPipeline {
        let policy = HttpLoggingPolicy::new(LoggingOptions::new(level))
            .unwrap()
            .with_sink(sink.clone());
        HttpPipeline::new(transport).add(policy)
    }

    #[tokio::test]
    async fn test_none_level_passes_response_through() {
        let sink = RecordingSink::new();
        let transport = MockTransport::new(ResponseTemplate::new(StatusCode::OK).with_json_body("{}"));
        let policy = HttpLoggingPolicy::new(LoggingOptions::default())
            .unwrap()
            .with_sink(sink.clone());
        let cache = policy.logger_cache().clone();
        let pipeline = HttpPipeline::new(transport.clone()).add(policy);

        let request = HttpRequest::parse(Method::GET, "https://host/").unwrap();
        let response = pipeline.send(request).await.unwrap();

        assert_eq!(Some(response_addr(response.as_ref())), transport.last_response_addr());
        assert_eq!(sink.attempts(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_basic_level_logs_request_and_response() {
        let sink = RecordingSink::new();
        let transport = MockTransport::new(ResponseTemplate::new(StatusCode::CREATED));
        let pipeline = pipeline(LogDetailLevel::Basic, transport, &sink);

        let request = HttpRequest::parse(Method::PUT, "https://host/items?token=t")
            .unwrap()
            .with_context(PipelineContext::new().with_retry_count(1));
        pipeline.send(request).await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "HTTP request");
        assert_eq!(records[0].field_str("method"), Some("PUT"));
        assert_eq!(records[0].field_str("url"), Some("https://host/items?token=REDACTED"));
        assert_eq!(records[0].field("tryCount"), Some(&json!(1)));
        assert_eq!(records[1].message, "HTTP response");
        assert_eq!(records[1].field("statusCode"), Some(&json!(201)));
        assert_eq!(records[1].logger, DEFAULT_LOGGER_NAME);
    }

    #[tokio::test]
    async fn test_logger_resolved_per_caller() {
        let sink = RecordingSink::new();
        let transport = MockTransport::new(ResponseTemplate::new(StatusCode::OK));
        let policy = HttpLoggingPolicy::new(LoggingOptions::new(LogDetailLevel::Basic))
            .unwrap()
            .with_sink(sink.clone());
        let cache = policy.logger_cache().clone();
        let pipeline = HttpPipeline::new(transport).add(policy);

        for caller in ["Widgets::get", "Widgets::list", "Widgets::get"] {
            let request = HttpRequest::parse(Method::GET, "https://host/")
                .unwrap()
                .with_context(PipelineContext::new().with_caller_method(caller));
            pipeline.send(request).await.unwrap();
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("Widgets::get"));
        assert!(sink.records().iter().all(|r| r.logger.starts_with("Widgets::")));
    }

    #[tokio::test]
    async fn test_downstream_error_logged_and_returned() {
        let sink = RecordingSink::new();
        let error = PipelineError::transport("connection reset");
        let pipeline = pipeline(LogDetailLevel::Headers, MockTransport::failing(error.clone()), &sink);

        let request = HttpRequest::parse(Method::GET, "https://host/a?sig=x").unwrap();
        let result = pipeline.send(request).await;
        assert_eq!(result.unwrap_err(), error);

        let failures = sink.records_with_message("HTTP FAILED");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].level, LogLevel::Warning);
        assert_eq!(failures[0].field_str("url"), Some("https://host/a?sig=REDACTED"));
        assert!(failures[0].field_str("error").unwrap().contains("connection reset"));
        assert_eq!(failures[0].field_str("errorCode"), Some("TRANSPORT_FAILED"));
        assert!(sink.records_with_message("HTTP response").is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_fail_call() {
        let sink = RecordingSink::failing();
        let transport = MockTransport::new(ResponseTemplate::new(StatusCode::OK).with_json_body(r#"{"a":1}"#));
        let pipeline = pipeline(LogDetailLevel::BodyAndHeaders, transport, &sink);

        let request = HttpRequest::parse(Method::GET, "https://host/").unwrap();
        let response = pipeline.send(request).await.unwrap();
        assert_eq!(response.body_string().await.unwrap(), r#"{"a":1}"#);
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn test_disabled_levels_skip_loggers() {
        let sink = RecordingSink::with_min_level(LogLevel::Error);
        let transport = MockTransport::new(ResponseTemplate::new(StatusCode::OK).with_json_body("{}"));
        let pipeline = pipeline(LogDetailLevel::BodyAndHeaders, transport.clone(), &sink);

        let request = HttpRequest::parse(Method::GET, "https://host/").unwrap();
        let response = pipeline.send(request).await.unwrap();

        assert_eq!(Some(response_addr(response.as_ref())), transport.last_response_addr());
        assert_eq!(sink.attempts(), 0);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = LoggingOptions::new(LogDetailLevel::Basic).with_allowed_header_name("bad header");
        let err = HttpLoggingPolicy::new(options).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
    }
}
