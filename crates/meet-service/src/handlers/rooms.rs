//! Room membership handlers.
//!
//! - `GET /api/rooms/{id}` - Room snapshot
//! - `POST /api/rooms/{id}/join` - Join with admission control
//! - `POST /api/rooms/{id}/leave` - Leave
//! - `PUT /api/rooms/{id}/limit` - Set the participant limit
//!
//! A full room is a normal outcome and answers 429 with
//! `{allowed: false, reason}` rather than the error envelope.

use crate::errors::MeetError;
use crate::models::{
    JoinAllowedResponse, JoinDeniedResponse, LeaveResponse, LimitResponse, MembershipRequest,
    RoomSnapshotResponse, SetLimitRequest,
};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::{JoinOutcome, LeaveOutcome};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn meeting_not_found() -> MeetError {
    MeetError::NotFound("Meeting not found".to_string())
}

/// Handler for POST /api/rooms/{id}/join
///
/// # Response
///
/// - 200 OK: `{allowed: true, participants, limit}` (also for a repeat join)
/// - 400 Bad Request: Blank `clientId`
/// - 404 Not Found: Unknown meeting
/// - 429 Too Many Requests: Room over participant limit
#[instrument(skip(state, request), fields(meeting_id = %id, client_id = %request.client_id))]
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MembershipRequest>,
) -> Result<Response, MeetError> {
    request
        .validate()
        .map_err(|e| MeetError::BadRequest(e.to_string()))?;

    let outcome = state.sessions.try_join(&id, &request.client_id);
    metrics::record_room_join(outcome.as_str());

    match outcome {
        JoinOutcome::Admitted {
            participants,
            limit,
        } => {
            info!(
                target: "meet.handlers.rooms",
                members = participants.len(),
                "Participant admitted"
            );
            Ok(Json(JoinAllowedResponse {
                allowed: true,
                participants,
                limit,
            })
            .into_response())
        }
        JoinOutcome::RoomFull => {
            warn!(target: "meet.handlers.rooms", "Join rejected, room full");
            Ok((
                StatusCode::TOO_MANY_REQUESTS,
                Json(JoinDeniedResponse::default()),
            )
                .into_response())
        }
        JoinOutcome::MeetingNotFound => Err(meeting_not_found()),
    }
}

/// Handler for POST /api/rooms/{id}/leave
///
/// # Response
///
/// - 200 OK: `{left: true, participants}` (also when not a member)
/// - 400 Bad Request: Blank `clientId`
/// - 404 Not Found: Unknown meeting
#[instrument(skip(state, request), fields(meeting_id = %id, client_id = %request.client_id))]
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MembershipRequest>,
) -> Result<Json<LeaveResponse>, MeetError> {
    request
        .validate()
        .map_err(|e| MeetError::BadRequest(e.to_string()))?;

    match state.sessions.leave(&id, &request.client_id) {
        LeaveOutcome::Left { participants } => {
            metrics::record_room_leave();
            info!(
                target: "meet.handlers.rooms",
                members = participants.len(),
                "Participant left"
            );
            Ok(Json(LeaveResponse {
                left: true,
                participants,
            }))
        }
        LeaveOutcome::MeetingNotFound => Err(meeting_not_found()),
    }
}

/// Handler for PUT /api/rooms/{id}/limit
///
/// Values below 1 are stored as 1. Lowering the limit does not remove
/// existing members.
#[instrument(skip(state, request), fields(meeting_id = %id, requested = request.limit))]
pub async fn set_room_limit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SetLimitRequest>,
) -> Result<Json<LimitResponse>, MeetError> {
    let limit = state
        .sessions
        .set_limit(&id, request.limit)
        .ok_or_else(meeting_not_found)?;

    Ok(Json(LimitResponse { limit }))
}

/// Handler for GET /api/rooms/{id}
#[instrument(skip(state), fields(meeting_id = %id))]
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoomSnapshotResponse>, MeetError> {
    let snapshot = state.sessions.snapshot(&id).ok_or_else(meeting_not_found)?;

    Ok(Json(RoomSnapshotResponse {
        id: snapshot.meeting.id,
        participants: snapshot.participants,
        limit: snapshot.limit,
        subscribers: snapshot.subscribers,
    }))
}
