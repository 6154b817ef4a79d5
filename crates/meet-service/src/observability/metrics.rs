//! Metrics definitions for the Meet Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `meet_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: HTTP methods
//! - `endpoint`: parameterized paths (meeting ids replaced by placeholders)
//! - `status`: 3 values (success, error, timeout)
//! - `outcome`: 3 values (admitted, room_full, meeting_not_found)
//! - `reason`: 2 values (full, closed)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("meet_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `meet_http_requests_total`, `meet_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("meet_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("meet_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        100..=399 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Replaces meeting ids with placeholders.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/health" | "/ready" | "/metrics" | "/api/meetings" | "/api/transcripts" => {
            return path.to_string();
        }
        _ => {}
    }

    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let normalized = match parts.as_slice() {
        ["api", "meetings", _] => "/api/meetings/{id}",
        ["api", "rooms", _] => "/api/rooms/{id}",
        ["api", "rooms", _, "join"] => "/api/rooms/{id}/join",
        ["api", "rooms", _, "leave"] => "/api/rooms/{id}/leave",
        ["api", "rooms", _, "limit"] => "/api/rooms/{id}/limit",
        ["api", "transcripts", _] => "/api/transcripts/{meetingId}",
        ["ws", "rooms", _] => "/ws/rooms/{id}",
        // Unknown paths normalized to "/other" to bound cardinality
        _ => "/other",
    };

    normalized.to_string()
}

// ============================================================================
// Room Metrics
// ============================================================================

/// Record a meeting creation.
///
/// Metric: `meet_meetings_created_total`
pub fn record_meeting_created() {
    counter!("meet_meetings_created_total").increment(1);
}

/// Record a join attempt and its admission outcome.
///
/// Metric: `meet_room_join_total`
/// Labels: `outcome` (admitted, room_full, meeting_not_found)
pub fn record_room_join(outcome: &str) {
    counter!("meet_room_join_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a leave request against a known meeting.
///
/// Metric: `meet_room_leave_total`
pub fn record_room_leave() {
    counter!("meet_room_leave_total").increment(1);
}

// ============================================================================
// Signaling Metrics
// ============================================================================

/// Track a signaling connection opening.
///
/// Metric: `meet_signaling_connections_active`
pub fn signaling_connection_opened() {
    gauge!("meet_signaling_connections_active").increment(1.0);
}

/// Track a signaling connection closing.
///
/// Metric: `meet_signaling_connections_active`
pub fn signaling_connection_closed() {
    gauge!("meet_signaling_connections_active").decrement(1.0);
}

/// Record one inbound signaling message accepted for fan-out.
///
/// Metric: `meet_signaling_messages_total`
pub fn record_signaling_message() {
    counter!("meet_signaling_messages_total").increment(1);
}

/// Record a fan-out delivery that was dropped for one subscriber.
///
/// Metric: `meet_signaling_deliveries_dropped_total`
/// Labels: `reason` (full, closed)
pub fn record_delivery_dropped(reason: &str) {
    counter!("meet_signaling_deliveries_dropped_total", "reason" => reason.to_string())
        .increment(1);
}

// ============================================================================
// Transcript Metrics
// ============================================================================

/// Record a transcript line appended.
///
/// Metric: `meet_transcript_lines_total`
pub fn record_transcript_line() {
    counter!("meet_transcript_lines_total").increment(1);
}
