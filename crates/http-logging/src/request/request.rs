//! Request abstraction handed through the pipeline

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use url::Url;

use super::{PipelineContext, RequestBody};
use crate::errors::{PipelineError, PipelineResult};
use crate::foundation::{HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE};

/// Outgoing HTTP request
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub context: PipelineContext,
}

/// Method, URL and headers of a sent request.
///
/// Responses keep this as their back-reference; the body is not retained
/// because a single-pass body no longer exists once sent.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            context: PipelineContext::new(),
        }
    }

    /// Create a request from a URL string
    pub fn parse(method: Method, url: &str) -> PipelineResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| PipelineError::invalid_request(format!("Invalid URL {}: {}", url, e)))?;
        Ok(Self::new(method, url))
    }

    /// Add header (consuming)
    pub fn with_header<K, V>(mut self, key: K, value: V) -> PipelineResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.add_header(key, value)?;
        Ok(self)
    }

    /// Append a header value, keeping existing values for the same name
    pub fn add_header<K, V>(&mut self, key: K, value: V) -> PipelineResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| PipelineError::invalid_request(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| PipelineError::invalid_request(format!("Invalid header value: {}", e)))?;
        self.headers.append(name, value);
        Ok(())
    }

    pub fn with_body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_context(mut self, context: PipelineContext) -> Self {
        self.context = context;
        self
    }

    /// Header value as a string (lossy for non-UTF-8 values)
    pub fn header_string(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    pub fn content_type(&self) -> Option<String> {
        self.header_string(HEADER_CONTENT_TYPE)
    }

    pub fn has_content_length(&self) -> bool {
        self.headers.contains_key(HEADER_CONTENT_LENGTH)
    }

    /// Snapshot of everything except the body
    pub fn head(&self) -> RequestHead {
        RequestHead {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
        }
    }
}
