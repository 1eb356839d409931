pub mod pipeline_error;
pub mod sink_error;

pub use pipeline_error::*;
pub use sink_error::SinkError;
