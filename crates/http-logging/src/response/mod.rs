//! Response abstraction returned through the pipeline.

pub mod response;

pub use response::{HttpResponse, StreamingResponse};
