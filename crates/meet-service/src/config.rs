//! Meet Service configuration.
//!
//! Configuration is loaded from environment variables. Every value has a
//! default, so an empty environment yields a runnable local setup.

use common::config::{LogFormat, ObservabilityConfig};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default HTTP/WebSocket bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default frontend base URL used to build join links.
pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:4200";

/// Default transcript directory (relative to the working directory).
pub const DEFAULT_TRANSCRIPTS_DIR: &str = "transcripts";

/// Default per-subscriber outbound queue depth.
pub const DEFAULT_SIGNALING_CHANNEL_BUFFER: usize = 64;

/// Default idle timeout for signaling connections in seconds.
pub const DEFAULT_SIGNALING_IDLE_TIMEOUT_SECONDS: u64 = 120;

/// Default keep-alive ping interval for signaling connections in seconds.
pub const DEFAULT_SIGNALING_PING_INTERVAL_SECONDS: u64 = 30;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default tracing directives when `RUST_LOG` is unset.
pub const DEFAULT_LOG_DIRECTIVES: &str = "meet_service=debug,tower_http=debug";

/// Meet Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Frontend base URL with any trailing slash removed.
    pub frontend_base_url: String,

    /// Directory holding per-meeting transcript files.
    pub transcripts_dir: PathBuf,

    /// Participant limit applied to new meetings. `None` leaves them unbounded.
    pub default_participant_limit: Option<u32>,

    /// Outbound queue depth for each signaling subscriber.
    pub signaling_channel_buffer: usize,

    /// Close a signaling connection after this many seconds without inbound frames.
    pub signaling_idle_timeout_seconds: u64,

    /// Keep-alive ping period for signaling connections.
    pub signaling_ping_interval_seconds: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Graceful shutdown drain period in seconds.
    pub drain_seconds: u64,

    /// Logging configuration.
    pub observability: ObservabilityConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("transcripts_dir", &self.transcripts_dir)
            .field("default_participant_limit", &self.default_participant_limit)
            .field("signaling_channel_buffer", &self.signaling_channel_buffer)
            .field(
                "signaling_idle_timeout_seconds",
                &self.signaling_idle_timeout_seconds,
            )
            .field(
                "signaling_ping_interval_seconds",
                &self.signaling_ping_interval_seconds,
            )
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("drain_seconds", &self.drain_seconds)
            .field("log_format", &self.observability.log_format)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid participant limit configuration: {0}")]
    InvalidParticipantLimit(String),

    #[error("Invalid signaling configuration: {0}")]
    InvalidSignaling(String),

    #[error("Invalid timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let frontend_base_url = vars
            .get("FRONTEND_BASE_URL")
            .map(String::as_str)
            .unwrap_or(DEFAULT_FRONTEND_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let transcripts_dir = vars
            .get("TRANSCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPTS_DIR));

        let default_participant_limit = match vars.get("DEFAULT_PARTICIPANT_LIMIT") {
            Some(value_str) => {
                let value: u32 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidParticipantLimit(format!(
                        "DEFAULT_PARTICIPANT_LIMIT must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidParticipantLimit(
                        "DEFAULT_PARTICIPANT_LIMIT must be greater than 0".to_string(),
                    ));
                }

                Some(value)
            }
            None => None,
        };

        let signaling_channel_buffer = parse_positive(
            vars,
            "SIGNALING_CHANNEL_BUFFER",
            DEFAULT_SIGNALING_CHANNEL_BUFFER as u64,
            ConfigError::InvalidSignaling,
        )? as usize;

        let signaling_idle_timeout_seconds = parse_positive(
            vars,
            "SIGNALING_IDLE_TIMEOUT_SECONDS",
            DEFAULT_SIGNALING_IDLE_TIMEOUT_SECONDS,
            ConfigError::InvalidSignaling,
        )?;

        let signaling_ping_interval_seconds = parse_positive(
            vars,
            "SIGNALING_PING_INTERVAL_SECONDS",
            DEFAULT_SIGNALING_PING_INTERVAL_SECONDS,
            ConfigError::InvalidSignaling,
        )?;

        if signaling_ping_interval_seconds >= signaling_idle_timeout_seconds {
            return Err(ConfigError::InvalidSignaling(format!(
                "SIGNALING_PING_INTERVAL_SECONDS ({}) must be less than SIGNALING_IDLE_TIMEOUT_SECONDS ({})",
                signaling_ping_interval_seconds, signaling_idle_timeout_seconds
            )));
        }

        let request_timeout_seconds = parse_positive(
            vars,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
            ConfigError::InvalidTimeout,
        )?;

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "DRAIN_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        let log_format = match vars.get("LOG_FORMAT") {
            Some(value_str) => value_str
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidLogFormat(e.to_string()))?,
            None => LogFormat::default(),
        };

        Ok(Config {
            bind_address,
            frontend_base_url,
            transcripts_dir,
            default_participant_limit,
            signaling_channel_buffer,
            signaling_idle_timeout_seconds,
            signaling_ping_interval_seconds,
            request_timeout_seconds,
            drain_seconds,
            observability: ObservabilityConfig {
                default_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
                log_format,
            },
        })
    }

    /// Build the public join link for a meeting.
    #[must_use]
    pub fn join_url(&self, meeting_id: &str) -> String {
        format!("{}/room/{}", self.frontend_base_url, meeting_id)
    }
}

/// Parse a strictly positive integer variable, falling back to `default` when unset.
fn parse_positive(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
    make_err: fn(String) -> ConfigError,
) -> Result<u64, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        make_err(format!(
            "{} must be a valid positive integer, got '{}': {}",
            name, value_str, e
        ))
    })?;

    if value == 0 {
        return Err(make_err(format!("{} must be greater than 0", name)));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load successfully");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.frontend_base_url, DEFAULT_FRONTEND_BASE_URL);
        assert_eq!(config.transcripts_dir, PathBuf::from("transcripts"));
        assert_eq!(config.default_participant_limit, None);
        assert_eq!(
            config.signaling_channel_buffer,
            DEFAULT_SIGNALING_CHANNEL_BUFFER
        );
        assert_eq!(
            config.signaling_idle_timeout_seconds,
            DEFAULT_SIGNALING_IDLE_TIMEOUT_SECONDS
        );
        assert_eq!(
            config.signaling_ping_interval_seconds,
            DEFAULT_SIGNALING_PING_INTERVAL_SECONDS
        );
        assert_eq!(
            config.request_timeout_seconds,
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        );
        assert_eq!(config.drain_seconds, 0);
        assert_eq!(config.observability.log_format, LogFormat::Text);
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string()),
            (
                "FRONTEND_BASE_URL".to_string(),
                "https://meet.example.com".to_string(),
            ),
            ("TRANSCRIPTS_DIR".to_string(), "/var/lib/meet".to_string()),
            ("DEFAULT_PARTICIPANT_LIMIT".to_string(), "8".to_string()),
            ("SIGNALING_CHANNEL_BUFFER".to_string(), "16".to_string()),
            (
                "SIGNALING_IDLE_TIMEOUT_SECONDS".to_string(),
                "60".to_string(),
            ),
            (
                "SIGNALING_PING_INTERVAL_SECONDS".to_string(),
                "10".to_string(),
            ),
            ("REQUEST_TIMEOUT_SECONDS".to_string(), "5".to_string()),
            ("DRAIN_SECONDS".to_string(), "15".to_string()),
            ("LOG_FORMAT".to_string(), "json".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.frontend_base_url, "https://meet.example.com");
        assert_eq!(config.transcripts_dir, PathBuf::from("/var/lib/meet"));
        assert_eq!(config.default_participant_limit, Some(8));
        assert_eq!(config.signaling_channel_buffer, 16);
        assert_eq!(config.signaling_idle_timeout_seconds, 60);
        assert_eq!(config.signaling_ping_interval_seconds, 10);
        assert_eq!(config.request_timeout_seconds, 5);
        assert_eq!(config.drain_seconds, 15);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_frontend_base_url_trailing_slashes_stripped() {
        let vars = HashMap::from([(
            "FRONTEND_BASE_URL".to_string(),
            "https://meet.example.com//".to_string(),
        )]);

        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.frontend_base_url, "https://meet.example.com");
        assert_eq!(
            config.join_url("abc-123"),
            "https://meet.example.com/room/abc-123"
        );
    }

    #[test]
    fn test_participant_limit_rejects_zero() {
        let vars = HashMap::from([("DEFAULT_PARTICIPANT_LIMIT".to_string(), "0".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidParticipantLimit(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_participant_limit_rejects_negative() {
        let vars = HashMap::from([("DEFAULT_PARTICIPANT_LIMIT".to_string(), "-3".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidParticipantLimit(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_channel_buffer_rejects_zero() {
        let vars = HashMap::from([("SIGNALING_CHANNEL_BUFFER".to_string(), "0".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidSignaling(msg)) if msg.contains("SIGNALING_CHANNEL_BUFFER must be greater than 0"))
        );
    }

    #[test]
    fn test_ping_interval_must_be_below_idle_timeout() {
        let vars = HashMap::from([
            (
                "SIGNALING_IDLE_TIMEOUT_SECONDS".to_string(),
                "30".to_string(),
            ),
            (
                "SIGNALING_PING_INTERVAL_SECONDS".to_string(),
                "30".to_string(),
            ),
        ]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidSignaling(msg)) if msg.contains("must be less than"))
        );
    }

    #[test]
    fn test_request_timeout_rejects_non_numeric() {
        let vars = HashMap::from([(
            "REQUEST_TIMEOUT_SECONDS".to_string(),
            "thirty".to_string(),
        )]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTimeout(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_drain_seconds_rejects_negative() {
        let vars = HashMap::from([("DRAIN_SECONDS".to_string(), "-1".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_log_format_rejects_unknown() {
        let vars = HashMap::from([("LOG_FORMAT".to_string(), "xml".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidLogFormat(msg)) if msg.contains("xml")));
    }
}
