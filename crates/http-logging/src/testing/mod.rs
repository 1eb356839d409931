//! Test doubles for pipelines and log sinks
//!
//! Provides:
//! - [`RecordingSink`] capturing every emitted record
//! - [`MockTransport`] answering requests from a [`ResponseTemplate`]
//! - [`ProbeResponse`] counting body reads and closes

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;

use crate::errors::{PipelineError, PipelineResult, SinkError};
use crate::foundation::{
    BoxFuture, CONTENT_TYPE_JSON, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE,
};
use crate::logging::{LogLevel, LogRecord, LogSink};
use crate::pipeline::{NextFuture, Transport};
use crate::request::{BodyStream, HttpRequest, PipelineContext, RequestHead};
use crate::response::{HttpResponse, StreamingResponse};

#[derive(Debug, Default)]
struct SinkState {
    records: Mutex<Vec<LogRecord>>,
    attempts: AtomicUsize,
    min_level: Option<LogLevel>,
    failing: bool,
}

/// Sink that keeps every record in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<SinkState>,
}

impl RecordingSink {
    /// Accepts every level
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `level` and above
    pub fn with_min_level(level: LogLevel) -> Self {
        Self {
            state: Arc::new(SinkState {
                min_level: Some(level),
                ..Default::default()
            }),
        }
    }

    /// Enabled for every level but fails on every emit
    pub fn failing() -> Self {
        Self {
            state: Arc::new(SinkState {
                failing: true,
                ..Default::default()
            }),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.state.records.lock().clone()
    }

    pub fn records_with_message(&self, message: &str) -> Vec<LogRecord> {
        self.state
            .records
            .lock()
            .iter()
            .filter(|record| record.message == message)
            .cloned()
            .collect()
    }

    /// Number of emit calls, including failed ones
    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.state.records.lock().clear();
    }
}

impl LogSink for RecordingSink {
    fn is_enabled(&self, _logger: &str, level: LogLevel) -> bool {
        self.state.min_level.map_or(true, |min| level >= min)
    }

    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.failing {
            return Err(SinkError::new("recording sink configured to fail"));
        }
        self.state.records.lock().push(record.clone());
        Ok(())
    }
}

/// Counters shared between a test and the responses it observes
#[derive(Debug, Clone, Default)]
pub struct ResponseProbe {
    body_reads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl ResponseProbe {
    pub fn body_reads(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Stream-backed response reporting to a [`ResponseProbe`]
#[derive(Debug)]
pub struct ProbeResponse {
    inner: StreamingResponse,
    probe: ResponseProbe,
}

impl HttpResponse for ProbeResponse {
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
        self.probe.body_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.body()
    }

    fn close(&self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close();
    }
}

/// Address of the object behind a response, for identity checks
pub fn response_addr(response: &dyn HttpResponse) -> usize {
    response as *const dyn HttpResponse as *const () as usize
}

#[derive(Debug, Clone)]
enum TemplateBody {
    Empty,
    Chunks(Vec<Bytes>),
    Pending,
}

/// Blueprint for the responses a [`MockTransport`] returns
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: TemplateBody,
}

impl ResponseTemplate {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: TemplateBody::Empty,
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Body delivered as one chunk. No headers are added.
    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = TemplateBody::Chunks(vec![body.into()]);
        self
    }

    /// Body delivered in several chunks. No headers are added.
    pub fn with_chunks<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.body = TemplateBody::Chunks(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Body stream that never yields, for reads that get cancelled
    pub fn with_pending_body(mut self) -> Self {
        self.body = TemplateBody::Pending;
        self
    }

    /// JSON body with matching content type and length headers
    pub fn with_json_body<S: Into<String>>(self, json: S) -> Self {
        let json = json.into();
        self.with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_header(HEADER_CONTENT_LENGTH, json.len().to_string())
            .with_body(json)
    }

    pub fn build(&self, request: RequestHead, probe: ResponseProbe) -> PipelineResult<ProbeResponse> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| PipelineError::internal(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PipelineError::internal(format!("Invalid header value: {}", e)))?;
            headers.append(name, value);
        }

        let body: BodyStream = match &self.body {
            TemplateBody::Empty => Box::pin(stream::empty::<PipelineResult<Bytes>>()),
            TemplateBody::Chunks(chunks) => Box::pin(stream::iter(
                chunks.clone().into_iter().map(Ok::<Bytes, PipelineError>),
            )),
            TemplateBody::Pending => Box::pin(stream::pending::<PipelineResult<Bytes>>()),
        };

        Ok(ProbeResponse {
            inner: StreamingResponse::new(request, self.status, headers, body),
            probe,
        })
    }
}

/// What a [`MockTransport`] received, with the body drained
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub head: RequestHead,
    pub body: Bytes,
    pub context: PipelineContext,
}

type Responder = Arc<dyn Fn(&SentRequest) -> PipelineResult<ResponseTemplate> + Send + Sync>;

/// In-memory transport recording requests and answering from templates
#[derive(Clone)]
pub struct MockTransport {
    responder: Responder,
    sent: Arc<Mutex<Vec<SentRequest>>>,
    probe: ResponseProbe,
    last_response: Arc<Mutex<Option<usize>>>,
}

impl MockTransport {
    /// Answer every request with `template`
    pub fn new(template: ResponseTemplate) -> Self {
        Self::with_responder(move |_| Ok(template.clone()))
    }

    /// Fail every request with `error`
    pub fn failing(error: PipelineError) -> Self {
        Self::with_responder(move |_| Err(error.clone()))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&SentRequest) -> PipelineResult<ResponseTemplate> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            sent: Arc::new(Mutex::new(Vec::new())),
            probe: ResponseProbe::default(),
            last_response: Arc::new(Mutex::new(None)),
        }
    }

    pub fn sent_requests(&self) -> Arc<Mutex<Vec<SentRequest>>> {
        self.sent.clone()
    }

    /// Counters for every response this transport produced
    pub fn probe(&self) -> ResponseProbe {
        self.probe.clone()
    }

    /// Address of the most recent response, see [`response_addr`]
    pub fn last_response_addr(&self) -> Option<usize> {
        *self.last_response.lock()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("sent", &self.sent.lock().len())
            .finish_non_exhaustive()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> NextFuture<'static> {
        let transport = self.clone();
        Box::pin(async move {
            let head = request.head();
            let context = request.context.clone();
            let body = request.body.into_bytes().await?;
            let sent = SentRequest {
                head: head.clone(),
                body,
                context,
            };

            let template = (transport.responder)(&sent);
            transport.sent.lock().push(sent);

            let response: Box<dyn HttpResponse> = Box::new(template?.build(head, transport.probe.clone())?);
            *transport.last_response.lock() = Some(response_addr(response.as_ref()));
            Ok(response)
        })
    }
}
