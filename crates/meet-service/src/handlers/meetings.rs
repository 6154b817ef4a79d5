//! Meeting handlers.
//!
//! - `POST /api/meetings` - Create a meeting
//! - `GET /api/meetings/{id}` - Look up a meeting

use crate::errors::MeetError;
use crate::models::{CreateMeetingResponse, MeetingResponse};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for POST /api/meetings
///
/// # Response
///
/// - 201 Created: `{id, joinUrl}`
#[instrument(skip(state))]
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateMeetingResponse>) {
    let meeting = state.sessions.create();
    let join_url = state.config.join_url(&meeting.id);
    metrics::record_meeting_created();

    info!(
        target: "meet.handlers.meetings",
        meeting_id = %meeting.id,
        join_url = %join_url,
        "Meeting created"
    );

    (
        StatusCode::CREATED,
        Json(CreateMeetingResponse {
            id: meeting.id,
            join_url,
        }),
    )
}

/// Handler for GET /api/meetings/{id}
///
/// # Response
///
/// - 200 OK: `{id, createdAt}`
/// - 404 Not Found: Unknown meeting
#[instrument(skip(state), fields(meeting_id = %id))]
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MeetingResponse>, MeetError> {
    let meeting = state
        .sessions
        .get(&id)
        .ok_or_else(|| MeetError::NotFound("Meeting not found".to_string()))?;

    Ok(Json(meeting.into()))
}
