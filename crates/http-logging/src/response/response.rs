//! Response trait and the stream-backed response transports produce

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures_util::stream;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;

use crate::errors::{PipelineError, PipelineResult};
use crate::foundation::{BoxFuture, HEADER_CONTENT_TYPE};
use crate::request::{collect_body, BodyStream, RequestHead};

/// HTTP response seen by pipeline policies and callers.
///
/// The body is single-consumption on transport responses: once read or
/// closed it cannot be read again. Decorators may relax that.
pub trait HttpResponse: Send + Sync + fmt::Debug {
    fn status(&self) -> StatusCode;

    fn headers(&self) -> &HeaderMap;

    /// Head of the request that produced this response
    fn request(&self) -> &RequestHead;

    /// Read the whole body
    fn body(&self) -> BoxFuture<'_, PipelineResult<Bytes>>;

    /// Release the underlying resources without reading the body
    fn close(&self);

    /// Read the whole body as text, replacing invalid UTF-8
    fn body_string(&self) -> BoxFuture<'_, PipelineResult<String>> {
        Box::pin(async move {
            let bytes = self.body().await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })
    }

    fn header_string(&self, name: &str) -> Option<String> {
        self.headers()
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    fn content_type(&self) -> Option<String> {
        self.header_string(HEADER_CONTENT_TYPE)
    }
}

/// Response whose body is a single-pass chunk stream
pub struct StreamingResponse {
    request: RequestHead,
    status: StatusCode,
    headers: HeaderMap,
    body: Mutex<Option<BodyStream>>,
    closed: AtomicBool,
}

impl StreamingResponse {
    pub fn new(request: RequestHead, status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            request,
            status,
            headers,
            body: Mutex::new(Some(body)),
            closed: AtomicBool::new(false),
        }
    }

    /// Response with the whole body available up front
    pub fn from_bytes<B: Into<Bytes>>(request: RequestHead, status: StatusCode, body: B) -> Self {
        let body = body.into();
        Self::new(
            request,
            status,
            HeaderMap::new(),
            Box::pin(stream::once(async move { Ok::<_, PipelineError>(body) })),
        )
    }

    pub fn empty(request: RequestHead, status: StatusCode) -> Self {
        Self::new(request, status, HeaderMap::new(), Box::pin(stream::empty()))
    }

    /// Add header (consuming)
    pub fn with_header<K, V>(mut self, key: K, value: V) -> PipelineResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| PipelineError::internal(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| PipelineError::internal(format!("Invalid header value: {}", e)))?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl HttpResponse for StreamingResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn request(&self) -> &RequestHead {
        &self.request
    }

    fn body(&self) -> BoxFuture<'_, PipelineResult<Bytes>> {
        Box::pin(async move {
            let stream = self.body.lock().take().ok_or(PipelineError::BodyConsumed)?;
            collect_body(stream).await
        })
    }

    fn close(&self) {
        self.body.lock().take();
        self.closed.store(true, Ordering::Release);
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("url", &self.request.url.as_str())
            .field("headers", &self.headers)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use url::Url;

    fn head() -> RequestHead {
        RequestHead {
            method: Method::GET,
            url: Url::parse("https://host/resource").unwrap(),
            headers: HeaderMap::new(),
        }
    }

    #[tokio::test]
    async fn test_body_is_single_consumption() {
        let response = StreamingResponse::from_bytes(head(), StatusCode::OK, "payload");

        assert_eq!(response.body_string().await.unwrap(), "payload");
        assert_eq!(response.body().await, Err(PipelineError::BodyConsumed));
    }

    #[tokio::test]
    async fn test_close_releases_body() {
        let response = StreamingResponse::from_bytes(head(), StatusCode::OK, "payload");
        response.close();

        assert!(response.is_closed());
        assert_eq!(response.body().await, Err(PipelineError::BodyConsumed));
    }

    #[test]
    fn test_headers() {
        let response = StreamingResponse::empty(head(), StatusCode::NO_CONTENT)
            .with_header("Content-Type", "text/plain")
            .unwrap();

        assert_eq!(response.content_type().as_deref(), Some("text/plain"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.request().url.path(), "/resource");
    }
}
