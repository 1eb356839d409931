pub mod cache;
pub mod client_logger;
pub mod config;
pub mod context;
pub mod level;
pub mod sink;

pub use cache::LoggerCache;
pub use client_logger::{ClientLogger, LogRecordBuilder};
pub use config::{init_logging, TracingConfig};
pub use context::LoggingContext;
pub use level::{LogDetailLevel, LogLevel};
pub use sink::{LogRecord, LogSink, TracingSink};
