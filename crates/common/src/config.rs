//! Common configuration types for Video Meet components.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Output format for the tracing fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Error returned when a `LOG_FORMAT` value is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log format '{0}', expected 'text' or 'json'")]
pub struct ParseLogFormatError(pub String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ParseLogFormatError(s.to_string())),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directives used when `RUST_LOG` is unset
    pub default_directives: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl ObservabilityConfig {
    /// Text output with the given default directives.
    #[must_use]
    pub fn new(default_directives: impl Into<String>) -> Self {
        Self {
            default_directives: default_directives.into(),
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parses_known_values() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" plain ".parse::<LogFormat>().unwrap(), LogFormat::Text);
    }

    #[test]
    fn test_log_format_rejects_unknown() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert_eq!(err, ParseLogFormatError("yaml".to_string()));
        assert!(err.to_string().contains("expected 'text' or 'json'"));
    }

    #[test]
    fn test_observability_config_new_uses_text() {
        let config = ObservabilityConfig::new("meet_service=info");
        assert_eq!(config.default_directives, "meet_service=info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_log_format_default_is_text() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
