/// Bodies at or above this size are never logged.
pub const MAX_BODY_LOG_SIZE: u64 = 16 * 1024;
pub const DEFAULT_LOGGER_CACHE_CAPACITY: usize = 1000;

pub const REDACTED_PLACEHOLDER: &str = "REDACTED";

pub const RETRY_COUNT_KEY: &str = "requestRetryCount";
pub const CALLER_METHOD_KEY: &str = "callerMethod";
pub const DEFAULT_LOGGER_NAME: &str = "http_logging::policy";

pub const LOG_DETAIL_LEVEL_ENV: &str = "HTTP_LOG_DETAIL_LEVEL";

pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_CONTENT_LENGTH: &str = "content-length";

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const REQUEST_LOG_MESSAGE: &str = "HTTP request";
pub const RESPONSE_LOG_MESSAGE: &str = "HTTP response";
pub const FAILURE_LOG_MESSAGE: &str = "HTTP FAILED";

// Record field keys
pub const METHOD_KEY: &str = "method";
pub const URL_KEY: &str = "url";
pub const TRY_COUNT_KEY: &str = "tryCount";
pub const CONTENT_LENGTH_KEY: &str = "contentLength";
pub const BODY_KEY: &str = "body";
pub const STATUS_CODE_KEY: &str = "statusCode";
pub const DURATION_MS_KEY: &str = "durationMs";
pub const ERROR_KEY: &str = "error";
pub const ERROR_CODE_KEY: &str = "errorCode";
