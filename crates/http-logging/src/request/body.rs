//! Request body representation
//!
//! A body is either absent, an in-memory buffer that can be sent any number
//! of times, or a single-pass stream of chunks.

use std::fmt;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, StreamExt};

use crate::errors::PipelineResult;

/// Boxed stream of body chunks
pub type BodyStream = Pin<Box<dyn Stream<Item = PipelineResult<Bytes>> + Send>>;

/// Drain a body stream into one contiguous buffer
pub async fn collect_body(mut stream: BodyStream) -> PipelineResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}

/// Body attached to an outgoing request
pub enum RequestBody {
    Empty,
    /// Replayable in-memory content
    Bytes(Bytes),
    /// Single-pass content with an optional declared length
    Stream {
        stream: BodyStream,
        length: Option<u64>,
    },
}

impl RequestBody {
    pub fn empty() -> Self {
        RequestBody::Empty
    }

    pub fn from_bytes<B: Into<Bytes>>(bytes: B) -> Self {
        RequestBody::Bytes(bytes.into())
    }

    pub fn from_stream<S>(stream: S, length: Option<u64>) -> Self
    where
        S: Stream<Item = PipelineResult<Bytes>> + Send + 'static,
    {
        RequestBody::Stream {
            stream: Box::pin(stream),
            length,
        }
    }

    /// Build a single-pass body from pre-split chunks
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        RequestBody::from_stream(stream::iter(chunks.into_iter().map(Ok)), None)
    }

    /// True when no body is attached at all
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// True when the body can be read without losing it
    pub fn is_replayable(&self) -> bool {
        !matches!(self, RequestBody::Stream { .. })
    }

    /// Length if known without reading the body
    pub fn known_length(&self) -> Option<u64> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Bytes(bytes) => Some(bytes.len() as u64),
            RequestBody::Stream { length, .. } => *length,
        }
    }

    /// Materialize the body in place and return a cheap handle to the buffer.
    ///
    /// A stream is drained and replaced with `RequestBody::Bytes`, so the
    /// request can still be sent afterwards. On a read failure the body is
    /// left empty.
    pub async fn buffer(&mut self) -> PipelineResult<Bytes> {
        match std::mem::take(self) {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Bytes(bytes) => {
                *self = RequestBody::Bytes(bytes.clone());
                Ok(bytes)
            }
            RequestBody::Stream { stream, .. } => {
                let bytes = collect_body(stream).await?;
                *self = RequestBody::Bytes(bytes.clone());
                Ok(bytes)
            }
        }
    }

    /// Consume the body into a single buffer
    pub async fn into_bytes(self) -> PipelineResult<Bytes> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Stream { stream, .. } => collect_body(stream).await,
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::Empty
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Stream { length, .. } => f
                .debug_struct("Stream")
                .field("length", length)
                .finish_non_exhaustive(),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Bytes(Bytes::from(text))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        RequestBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[tokio::test]
    async fn test_buffer_replaces_stream_with_bytes() {
        let mut body = RequestBody::from_chunks(vec![
            Bytes::from_static(b"hello "),
            Bytes::from_static(b"world"),
        ]);
        assert!(!body.is_replayable());
        assert_eq!(body.known_length(), None);

        let buffered = body.buffer().await.unwrap();
        assert_eq!(&buffered[..], b"hello world");
        assert!(body.is_replayable());
        assert_eq!(body.known_length(), Some(11));

        let sent = body.into_bytes().await.unwrap();
        assert_eq!(sent, buffered);
    }

    #[tokio::test]
    async fn test_buffer_propagates_stream_errors() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(PipelineError::body_read("socket closed")),
        ];
        let mut body = RequestBody::from_stream(futures_util::stream::iter(chunks), Some(20));

        let result = body.buffer().await;
        assert!(matches!(result, Err(PipelineError::BodyRead { .. })));
        assert!(body.is_empty());
    }

    #[test]
    fn test_known_length() {
        assert_eq!(RequestBody::empty().known_length(), Some(0));
        assert_eq!(RequestBody::from("abc").known_length(), Some(3));
        let stream = RequestBody::from_stream(futures_util::stream::empty(), Some(42));
        assert_eq!(stream.known_length(), Some(42));
    }
}
