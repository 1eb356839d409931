//! Outgoing request model consumed by pipeline policies.

pub mod body;
pub mod context;
pub mod request;

pub use body::{collect_body, BodyStream, RequestBody};
pub use context::PipelineContext;
pub use request::{HttpRequest, RequestHead};
