//! # Pipeline
//!
//! Client-side policy chain with the handle(request, next) pattern. Each
//! policy decides when to pass the request on; the last stage is a
//! [`Transport`] that actually produces the response.

pub mod pipeline;

pub use pipeline::{HttpPipeline, Next, NextFuture, PipelinePolicy, Transport};
