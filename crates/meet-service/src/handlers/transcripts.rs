//! Transcript handlers.
//!
//! - `POST /api/transcripts` - Append a line to a meeting's transcript
//! - `GET /api/transcripts/{meetingId}` - Download a meeting's transcript

use crate::errors::MeetError;
use crate::models::{TranscriptRequest, TranscriptResponse};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::TranscriptService;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::instrument;

/// Handler for POST /api/transcripts
///
/// # Response
///
/// - 200 OK: `{path}`
/// - 400 Bad Request: Blank `meetingId` or `text`, or an unusable `meetingId`
/// - 500 Internal Server Error: The file could not be written
#[instrument(skip(state, request), fields(meeting_id = %request.meeting_id))]
pub async fn append_transcript(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>, MeetError> {
    request
        .validate()
        .map_err(|e| MeetError::BadRequest(e.to_string()))?;

    let path = state
        .transcripts
        .append(
            &request.meeting_id,
            request.speaker_or_default(),
            &request.text,
        )
        .await?;
    metrics::record_transcript_line();

    Ok(Json(TranscriptResponse {
        path: path.display().to_string(),
    }))
}

/// Handler for GET /api/transcripts/{meetingId}
///
/// Streams the file as a `text/plain` attachment.
///
/// # Response
///
/// - 200 OK: File contents
/// - 400 Bad Request: Unusable `meetingId`
/// - 404 Not Found: Nothing written for the meeting yet
#[instrument(skip(state))]
pub async fn download_transcript(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<String>,
) -> Result<Response, MeetError> {
    let file = state
        .transcripts
        .open(&meeting_id)
        .await?
        .ok_or_else(|| MeetError::NotFound("Transcript not found".to_string()))?;

    let disposition = format!(
        "attachment; filename={}",
        TranscriptService::file_name(meeting_id.trim())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::observability::HealthState;
    use crate::routes::build_routes;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn test_app(dir: &std::path::Path) -> Router {
        let vars = HashMap::from([(
            "TRANSCRIPTS_DIR".to_string(),
            dir.display().to_string(),
        )]);
        let config = Config::from_vars(&vars).unwrap();
        build_routes(
            Arc::new(AppState::new(config)),
            Arc::new(HealthState::new()),
            None,
        )
    }

    fn post_line(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/transcripts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_then_download() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path());

        let response = app
            .clone()
            .oneshot(post_line(json!({"meetingId": "m1", "text": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["path"].as_str().unwrap().ends_with("meeting-m1.txt"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/transcripts/m1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=meeting-m1.txt"
        );
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.ends_with("] user: hello\n"));
    }

    #[tokio::test]
    async fn test_download_missing_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let response = test_app(tmp.path())
            .oneshot(
                Request::builder()
                    .uri("/api/transcripts/nothing-yet")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_lines_are_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path());

        for body in [
            json!({"meetingId": "", "text": "hi"}),
            json!({"meetingId": "m1", "text": "  "}),
            json!({"meetingId": "../escape", "text": "hi"}),
        ] {
            let response = app.clone().oneshot(post_line(body.clone())).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        }

        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }
}
