//! Observability module for the Meet Service.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `meet_http_requests_total` | Counter | `method`, `endpoint`, `status_code` | Request volume |
//! | `meet_http_request_duration_seconds` | Histogram | `method`, `endpoint`, `status` | Request latency |
//! | `meet_meetings_created_total` | Counter | none | Meetings created |
//! | `meet_room_join_total` | Counter | `outcome` | Admission decisions |
//! | `meet_room_leave_total` | Counter | none | Explicit leaves |
//! | `meet_signaling_connections_active` | Gauge | none | Live signaling sockets |
//! | `meet_signaling_messages_total` | Counter | none | Inbound messages fanned out |
//! | `meet_signaling_deliveries_dropped_total` | Counter | `reason` | Per-subscriber delivery drops |
//! | `meet_transcript_lines_total` | Counter | none | Transcript lines appended |

pub mod health;
pub mod metrics;

pub use health::{health_router, HealthState};
pub use metrics::init_metrics_recorder;
