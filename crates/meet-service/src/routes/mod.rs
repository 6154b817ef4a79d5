//! HTTP routes for the Meet Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::observability::{health_router, HealthState};
use crate::services::{RoomSessions, TranscriptService};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Meetings, rooms and signaling.
    pub sessions: Arc<RoomSessions>,

    /// Transcript files.
    pub transcripts: Arc<TranscriptService>,

    /// Cancelled when the server begins shutting down; ends open signaling
    /// connections.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build fresh state from configuration.
    pub fn new(config: Config) -> Self {
        let sessions = RoomSessions::new(
            config.default_participant_limit,
            config.signaling_channel_buffer,
        );
        let transcripts = TranscriptService::new(config.transcripts_dir.clone());

        Self {
            config,
            sessions: Arc::new(sessions),
            transcripts: Arc::new(transcripts),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ready` - Liveness and readiness probes
/// - `/metrics` - Prometheus metrics (only when a handle is supplied)
/// - `/api/meetings` - Create meeting
/// - `/api/meetings/:id` - Get meeting
/// - `/api/rooms/:id` - Room snapshot
/// - `/api/rooms/:id/join`, `/api/rooms/:id/leave` - Room membership
/// - `/api/rooms/:id/limit` - Set participant limit
/// - `/api/transcripts`, `/api/transcripts/:meeting_id` - Transcripts
/// - `/ws/rooms/:id` - Signaling WebSocket
/// - Permissive CORS, TraceLayer, request timeout and HTTP metrics
pub fn build_routes(
    state: Arc<AppState>,
    health: Arc<HealthState>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let api_routes = Router::new()
        .route("/api/meetings", post(handlers::create_meeting))
        .route("/api/meetings/:id", get(handlers::get_meeting))
        .route("/api/rooms/:id", get(handlers::get_room))
        .route("/api/rooms/:id/join", post(handlers::join_room))
        .route("/api/rooms/:id/leave", post(handlers::leave_room))
        .route("/api/rooms/:id/limit", put(handlers::set_room_limit))
        .route("/api/transcripts", post(handlers::append_transcript))
        .route(
            "/api/transcripts/:meeting_id",
            get(handlers::download_transcript),
        )
        .route("/ws/rooms/:id", get(handlers::signaling_socket))
        .with_state(state);

    let mut router = api_routes.merge(health_router(health));

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route("/metrics", get(handlers::metrics_handler))
            .with_state(handle);
        router = router.merge(metrics_routes);
    }

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflights, add CORS headers
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = Config::from_vars(&HashMap::new()).expect("default config is valid");
        build_routes(
            Arc::new(AppState::new(config)),
            Arc::new(HealthState::new()),
            None,
        )
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_handle() {
        let response = test_app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/meetings")
                    .header(header::ORIGIN, "http://localhost:4200")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
