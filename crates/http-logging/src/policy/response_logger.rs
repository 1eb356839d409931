//! Response logging and the deferred body-logging response wrapper

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::body_gate::{content_length, declared_content_length, format_body, should_log_body};
use super::options::LogSettings;
use super::redaction::{redact_headers, redact_url};
use crate::errors::{PipelineError, PipelineResult};
use crate::foundation::{
    BoxFuture, BODY_KEY, CONTENT_LENGTH_KEY, DURATION_MS_KEY, RESPONSE_LOG_MESSAGE, STATUS_CODE_KEY,
    URL_KEY,
};
use crate::logging::{ClientLogger, LogLevel, LogRecordBuilder, LoggingContext};
use crate::request::RequestHead;
use crate::response::HttpResponse;

/// Severity override for responses
pub type ResponseLevelSelector = Arc<dyn Fn(&dyn HttpResponse) -> LogLevel + Send + Sync>;

/// Pluggable response logging behavior
pub trait HttpResponseLogger: Send + Sync + fmt::Debug {
    /// Severity the response is logged at
    fn log_level(&self, _response: &dyn HttpResponse, _context: &LoggingContext) -> LogLevel {
        LogLevel::Informational
    }

    /// Emit the response record, or arrange for it to be emitted when the
    /// body is read. Returns the response the caller should see.
    fn log_response(
        &self,
        logger: Arc<ClientLogger>,
        response: Box<dyn HttpResponse>,
        settings: &LogSettings,
        context: &LoggingContext,
        level: LogLevel,
    ) -> Box<dyn HttpResponse>;
}

/// Standard response logger
#[derive(Clone, Default)]
pub struct DefaultHttpResponseLogger {
    level_selector: Option<ResponseLevelSelector>,
}

impl DefaultHttpResponseLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&dyn HttpResponse) -> LogLevel + Send + Sync + 'static,
    {
        self.level_selector = Some(Arc::new(selector));
        self
    }
}

impl fmt::Debug for DefaultHttpResponseLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultHttpResponseLogger")
            .field("level_selector", &self.level_selector.is_some())
            .finish()
    }
}

impl HttpResponseLogger for DefaultHttpResponseLogger {
    fn log_level(&self, response: &dyn HttpResponse, _context: &LoggingContext) -> LogLevel {
        match &self.level_selector {
            Some(selector) => selector(response),
            None => LogLevel::Informational,
        }
    }

    fn log_response(
        &self,
        logger: Arc<ClientLogger>,
        response: Box<dyn HttpResponse>,
        settings: &LogSettings,
        context: &LoggingContext,
        level: LogLevel,
    ) -> Box<dyn HttpResponse> {
        if !logger.can_log(level) {
            return response;
        }

        let mut fields = Map::new();
        let length = content_length(&logger, response.headers());
        if declared_content_length(response.headers()).is_some() {
            fields.insert(CONTENT_LENGTH_KEY.to_string(), Value::from(length));
        }

        if settings.level.should_log_url() {
            let duration_ms = u64::try_from(context.elapsed().as_millis()).unwrap_or(u64::MAX);
            fields.insert(STATUS_CODE_KEY.to_string(), Value::from(response.status().as_u16()));
            fields.insert(
                URL_KEY.to_string(),
                Value::String(redact_url(&response.request().url, &settings.query_params)),
            );
            fields.insert(DURATION_MS_KEY.to_string(), Value::from(duration_ms));
        }

        if settings.level.should_log_headers() && logger.can_log(LogLevel::Informational) {
            fields.extend(redact_headers(response.headers(), &settings.headers));
        }

        let content_type = response.content_type();
        if settings.level.should_log_body() && should_log_body(content_type.as_deref(), length) {
            return Box::new(LoggingHttpResponse::new(
                response,
                logger,
                level,
                fields,
                content_type,
                settings.pretty_print_body,
            ));
        }

        logger.at(level).fields(fields).emit(RESPONSE_LOG_MESSAGE);
        response
    }
}

enum BodyLogState {
    Unread { level: LogLevel, fields: Map<String, Value> },
    Logged { body: Option<Bytes> },
}

/// Deferred response record that is emitted without a body when dropped
/// before the body arrives (read error or cancelled read).
struct PendingRecord<'a> {
    record: Option<LogRecordBuilder<'a>>,
}

impl<'a> PendingRecord<'a> {
    fn new(record: LogRecordBuilder<'a>) -> Self {
        Self { record: Some(record) }
    }

    fn emit_with_body(mut self, body: String) {
        if let Some(record) = self.record.take() {
            record.field(BODY_KEY, body).emit(RESPONSE_LOG_MESSAGE);
        }
    }
}

impl Drop for PendingRecord<'_> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            record.emit(RESPONSE_LOG_MESSAGE);
        }
    }
}

/// Response decorator that logs the body the first time it is read.
///
/// Status, headers, request and close go straight to the wrapped response.
/// The first `body()` call drains the inner body, emits the pending record
/// with the body attached and keeps the bytes; every later call returns the
/// same bytes without logging again. If that first read fails or is
/// dropped before completing, the record is emitted without a body and
/// later reads return [`PipelineError::BodyConsumed`]. Concurrent readers
/// are serialized on a per-wrapper lock.
pub struct LoggingHttpResponse {
    inner: Box<dyn HttpResponse>,
    logger: Arc<ClientLogger>,
    content_type: Option<String>,
    pretty_print_body: bool,
    state: Mutex<BodyLogState>,
}

impl LoggingHttpResponse {
    pub(crate) fn new(
        inner: Box<dyn HttpResponse>,
        logger: Arc<ClientLogger>,
        level: LogLevel,
        fields: Map<String, Value>,
        content_type: Option<String>,
        pretty_print_body: bool,
    ) -> Self {
        Self {
            inner,
            logger,
            content_type,
            pretty_print_body,
            state: Mutex::new(BodyLogState::Unread { level, fields }),
        }
    }

    /// Whether the deferred record has been emitted
    pub async fn is_logged(&self) -> bool {
        matches!(*self.state.lock().await, BodyLogState::Logged { .. })
    }
}

impl HttpResponse for LoggingHttpResponse {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn request(&self) -> &RequestHead {
        self.inner.request()
    }

    fn body(&self) -> BoxFuture<'_, PipelineResult<Bytes>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, BodyLogState::Logged { body: None }) {
                BodyLogState::Logged { body } => {
                    *state = BodyLogState::Logged { body: body.clone() };
                    body.ok_or(PipelineError::BodyConsumed)
                }
                BodyLogState::Unread { level, fields } => {
                    let pending = PendingRecord::new(self.logger.at(level).fields(fields));
                    let bytes = self.inner.body().await?;
                    pending.emit_with_body(format_body(
                        self.content_type.as_deref(),
                        &bytes,
                        self.pretty_print_body,
                    ));
                    *state = BodyLogState::Logged {
                        body: Some(bytes.clone()),
                    };
                    Ok(bytes)
                }
            }
        })
    }

    fn close(&self) {
        self.inner.close();
    }
}

impl fmt::Debug for LoggingHttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingHttpResponse")
            .field("inner", &self.inner)
            .field("logger", &self.logger.name())
            .finish_non_exhaustive()
    }
}
