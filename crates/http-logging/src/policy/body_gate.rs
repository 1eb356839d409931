//! Body logging eligibility and formatting

use http::HeaderMap;
use serde_json::Value;

use crate::foundation::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM, HEADER_CONTENT_LENGTH, MAX_BODY_LOG_SIZE,
};
use crate::logging::{ClientLogger, LogLevel};

/// Whether a body with this content type and length may be logged.
///
/// Binary payloads are never logged; empty and oversized (>= 16 KiB) bodies
/// are skipped.
pub fn should_log_body(content_type: Option<&str>, content_length: u64) -> bool {
    if content_type.is_some_and(|ct| media_type(ct).eq_ignore_ascii_case(CONTENT_TYPE_OCTET_STREAM)) {
        return false;
    }
    content_length != 0 && content_length < MAX_BODY_LOG_SIZE
}

/// `Content-Length` as declared, `None` when the header is absent
pub fn declared_content_length(headers: &HeaderMap) -> Option<Result<u64, String>> {
    let value = headers.get(HEADER_CONTENT_LENGTH)?;
    Some(
        value
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|s| s.trim().parse::<u64>().map_err(|e| e.to_string())),
    )
}

/// Content length for gating: missing or unparsable headers count as 0.
/// Negative values are unparsable here. An unparsable value is noted at
/// verbose level and otherwise ignored.
pub fn content_length(logger: &ClientLogger, headers: &HeaderMap) -> u64 {
    match declared_content_length(headers) {
        Some(Ok(length)) => length,
        Some(Err(error)) => {
            logger
                .at(LogLevel::Verbose)
                .field("header", HEADER_CONTENT_LENGTH)
                .field("error", error)
                .emit("Could not parse the HTTP header content-length");
            0
        }
        None => 0,
    }
}

/// Body text as logged: lossy UTF-8, JSON re-indented when asked to
pub fn format_body(content_type: Option<&str>, body: &[u8], pretty_print: bool) -> String {
    if pretty_print && content_type.is_some_and(|ct| media_type(ct).eq_ignore_ascii_case(CONTENT_TYPE_JSON)) {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}
