//! Detail and severity levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::foundation::LOG_DETAIL_LEVEL_ENV;

/// How much of each request/response gets logged.
///
/// Ordered: every level includes everything logged by the levels below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDetailLevel {
    #[default]
    None,
    /// Method, URL, status, duration, try count and content length
    Basic,
    /// Basic plus redacted headers
    Headers,
    /// Headers plus gated bodies
    BodyAndHeaders,
}

impl LogDetailLevel {
    pub fn should_log_url(self) -> bool {
        self >= LogDetailLevel::Basic
    }

    pub fn should_log_headers(self) -> bool {
        self >= LogDetailLevel::Headers
    }

    pub fn should_log_body(self) -> bool {
        self >= LogDetailLevel::BodyAndHeaders
    }

    /// Level from `HTTP_LOG_DETAIL_LEVEL`, `None` when unset or unknown
    pub fn from_env() -> Self {
        match std::env::var(LOG_DETAIL_LEVEL_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}: {}", LOG_DETAIL_LEVEL_ENV, e);
                LogDetailLevel::None
            }),
            Err(_) => LogDetailLevel::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogDetailLevel::None => "none",
            LogDetailLevel::Basic => "basic",
            LogDetailLevel::Headers => "headers",
            LogDetailLevel::BodyAndHeaders => "body_and_headers",
        }
    }
}

impl FromStr for LogDetailLevel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LogDetailLevel::None),
            "basic" => Ok(LogDetailLevel::Basic),
            "headers" => Ok(LogDetailLevel::Headers),
            "body" | "body_and_headers" | "bodyandheaders" => Ok(LogDetailLevel::BodyAndHeaders),
            other => Err(PipelineError::config(format!("Unknown log detail level: {}", other))),
        }
    }
}

impl fmt::Display for LogDetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an emitted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Verbose,
    Informational,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Verbose => "verbose",
            LogLevel::Informational => "informational",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LoggingOptions;

    #[test]
    fn test_detail_levels_are_cumulative() {
        assert!(!LogDetailLevel::None.should_log_url());
        assert!(LogDetailLevel::Basic.should_log_url());
        assert!(!LogDetailLevel::Basic.should_log_headers());
        assert!(LogDetailLevel::Headers.should_log_url());
        assert!(LogDetailLevel::Headers.should_log_headers());
        assert!(!LogDetailLevel::Headers.should_log_body());
        assert!(LogDetailLevel::BodyAndHeaders.should_log_url());
        assert!(LogDetailLevel::BodyAndHeaders.should_log_headers());
        assert!(LogDetailLevel::BodyAndHeaders.should_log_body());
    }

    #[test]
    fn test_detail_level_parsing() {
        assert_eq!("NONE".parse::<LogDetailLevel>().unwrap(), LogDetailLevel::None);
        assert_eq!(" headers ".parse::<LogDetailLevel>().unwrap(), LogDetailLevel::Headers);
        assert_eq!("body".parse::<LogDetailLevel>().unwrap(), LogDetailLevel::BodyAndHeaders);
        assert_eq!(
            "BODY_AND_HEADERS".parse::<LogDetailLevel>().unwrap(),
            LogDetailLevel::BodyAndHeaders
        );
        assert!("verbose".parse::<LogDetailLevel>().is_err());
    }

    #[test]
    fn test_detail_level_serde() {
        let level: LogDetailLevel = serde_json::from_str("\"body_and_headers\"").unwrap();
        assert_eq!(level, LogDetailLevel::BodyAndHeaders);
        assert_eq!(serde_json::to_string(&LogDetailLevel::Basic).unwrap(), "\"basic\"");
    }

    #[test]
    fn test_detail_level_from_env() {
        std::env::set_var(LOG_DETAIL_LEVEL_ENV, "Headers");
        assert_eq!(LogDetailLevel::from_env(), LogDetailLevel::Headers);
        assert_eq!(LoggingOptions::from_env().level, LogDetailLevel::Headers);

        std::env::set_var(LOG_DETAIL_LEVEL_ENV, "loud");
        assert_eq!(LogDetailLevel::from_env(), LogDetailLevel::None);

        std::env::remove_var(LOG_DETAIL_LEVEL_ENV);
        assert_eq!(LogDetailLevel::from_env(), LogDetailLevel::None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Verbose < LogLevel::Informational);
        assert!(LogLevel::Warning < LogLevel::Error);
    }
}
