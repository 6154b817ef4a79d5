//! Meet Service models.
//!
//! Contains the room registry's domain types and the JSON request/response
//! bodies of the HTTP API. Field names on the wire are camelCase to match
//! the web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::num::NonZeroU32;

/// Reason string returned when admission control rejects a join.
pub const ROOM_FULL_REASON: &str = "room over participant limit";

/// Speaker name used when a transcript line has none.
pub const DEFAULT_TRANSCRIPT_SPEAKER: &str = "user";

// ============================================================================
// Domain Types
// ============================================================================

/// A meeting known to this process.
///
/// Both fields are set once at creation and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    /// Opaque unique meeting identifier.
    pub id: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Capacity limit of a room.
///
/// Serialized as the number, or `null` when unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "Option<u32>")]
pub enum ParticipantLimit {
    /// No limit has been set.
    #[default]
    Unbounded,

    /// At most this many participants.
    Bounded(NonZeroU32),
}

impl ParticipantLimit {
    /// Normalise a requested limit: anything below 1 becomes 1 and anything
    /// above `u32::MAX` saturates.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        let value = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        Self::Bounded(NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN))
    }

    /// Whether a room currently holding `current` members has a free slot.
    #[must_use]
    pub fn has_room_for_another(&self, current: usize) -> bool {
        match self {
            ParticipantLimit::Unbounded => true,
            ParticipantLimit::Bounded(max) => {
                usize::try_from(max.get()).map_or(true, |max| current < max)
            }
        }
    }

    /// The numeric limit, if any.
    #[must_use]
    pub fn as_option(&self) -> Option<u32> {
        match self {
            ParticipantLimit::Unbounded => None,
            ParticipantLimit::Bounded(max) => Some(max.get()),
        }
    }
}

impl From<ParticipantLimit> for Option<u32> {
    fn from(limit: ParticipantLimit) -> Self {
        limit.as_option()
    }
}

// ============================================================================
// Meeting API Models
// ============================================================================

/// Response for `POST /api/meetings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingResponse {
    /// Meeting ID.
    pub id: String,

    /// Frontend link for joining the meeting.
    pub join_url: String,
}

/// Response for `GET /api/meetings/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    /// Meeting ID.
    pub id: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: DateTime<Utc>,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        Self {
            id: meeting.id,
            created_at: meeting.created_at,
        }
    }
}

// ============================================================================
// Room API Models
// ============================================================================

/// Request body for join and leave.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    /// Client identifier chosen by the web client.
    #[serde(default)]
    pub client_id: String,
}

impl MembershipRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("clientId must not be blank");
        }

        Ok(())
    }
}

/// Response for an admitted join.
#[derive(Debug, Clone, Serialize)]
pub struct JoinAllowedResponse {
    /// Always `true`.
    pub allowed: bool,

    /// Members after the join.
    pub participants: BTreeSet<String>,

    /// Room limit (`null` when unbounded).
    pub limit: ParticipantLimit,
}

/// Response for a join rejected by admission control (HTTP 429).
#[derive(Debug, Clone, Serialize)]
pub struct JoinDeniedResponse {
    /// Always `false`.
    pub allowed: bool,

    /// Human-readable reason.
    pub reason: String,
}

impl Default for JoinDeniedResponse {
    fn default() -> Self {
        Self {
            allowed: false,
            reason: ROOM_FULL_REASON.to_string(),
        }
    }
}

/// Response for `POST /api/rooms/{id}/leave`.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveResponse {
    /// Always `true`.
    pub left: bool,

    /// Members after the leave.
    pub participants: BTreeSet<String>,
}

/// Request body for `PUT /api/rooms/{id}/limit`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetLimitRequest {
    /// Requested limit. Values below 1 are clamped to 1.
    pub limit: i64,
}

/// Response for `PUT /api/rooms/{id}/limit`.
#[derive(Debug, Clone, Serialize)]
pub struct LimitResponse {
    /// Stored limit after clamping.
    pub limit: ParticipantLimit,
}

/// Response for `GET /api/rooms/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshotResponse {
    /// Meeting ID.
    pub id: String,

    /// Current members.
    pub participants: BTreeSet<String>,

    /// Room limit (`null` when unbounded).
    pub limit: ParticipantLimit,

    /// Number of live signaling channels.
    pub subscribers: usize,
}

// ============================================================================
// Transcript API Models
// ============================================================================

/// Request body for `POST /api/transcripts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    /// Meeting the line belongs to.
    #[serde(default)]
    pub meeting_id: String,

    /// Speaker name; defaults to `user`.
    pub speaker: Option<String>,

    /// Spoken text.
    #[serde(default)]
    pub text: String,
}

impl TranscriptRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.meeting_id.trim().is_empty() {
            return Err("meetingId must not be blank");
        }

        if self.text.trim().is_empty() {
            return Err("text must not be blank");
        }

        Ok(())
    }

    /// Speaker name to record.
    #[must_use]
    pub fn speaker_or_default(&self) -> &str {
        match self.speaker.as_deref() {
            Some(speaker) if !speaker.trim().is_empty() => speaker,
            _ => DEFAULT_TRANSCRIPT_SPEAKER,
        }
    }
}

/// Response for `POST /api/transcripts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    /// Path of the transcript file that was appended to.
    pub path: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_limit_default_is_unbounded() {
        assert_eq!(ParticipantLimit::default(), ParticipantLimit::Unbounded);
        assert_eq!(ParticipantLimit::default().as_option(), None);
    }

    #[test]
    fn test_participant_limit_clamps_non_positive_to_one() {
        assert_eq!(ParticipantLimit::clamped(0).as_option(), Some(1));
        assert_eq!(ParticipantLimit::clamped(-5).as_option(), Some(1));
        assert_eq!(ParticipantLimit::clamped(i64::MIN).as_option(), Some(1));
    }

    #[test]
    fn test_participant_limit_saturates_large_values() {
        assert_eq!(
            ParticipantLimit::clamped(i64::MAX).as_option(),
            Some(u32::MAX)
        );
        assert_eq!(ParticipantLimit::clamped(7).as_option(), Some(7));
    }

    #[test]
    fn test_participant_limit_has_room_for_another() {
        let limit = ParticipantLimit::clamped(2);
        assert!(limit.has_room_for_another(0));
        assert!(limit.has_room_for_another(1));
        assert!(!limit.has_room_for_another(2));
        assert!(!limit.has_room_for_another(3));

        assert!(ParticipantLimit::Unbounded.has_room_for_another(usize::MAX));
    }

    #[test]
    fn test_participant_limit_serializes_as_number_or_null() {
        let bounded = serde_json::to_value(ParticipantLimit::clamped(4)).unwrap();
        assert_eq!(bounded, serde_json::json!(4));

        let unbounded = serde_json::to_value(ParticipantLimit::Unbounded).unwrap();
        assert_eq!(unbounded, serde_json::Value::Null);
    }

    #[test]
    fn test_create_meeting_response_uses_camel_case() {
        let response = CreateMeetingResponse {
            id: "m1".to_string(),
            join_url: "http://localhost:4200/room/m1".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["joinUrl"], "http://localhost:4200/room/m1");
        assert!(json.get("join_url").is_none());
    }

    #[test]
    fn test_membership_request_validation() {
        let ok: MembershipRequest = serde_json::from_str(r#"{"clientId":"a"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let blank: MembershipRequest = serde_json::from_str(r#"{"clientId":"  "}"#).unwrap();
        assert_eq!(blank.validate(), Err("clientId must not be blank"));

        let missing: MembershipRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_join_denied_response_default() {
        let json = serde_json::to_value(JoinDeniedResponse::default()).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"], ROOM_FULL_REASON);
    }

    #[test]
    fn test_transcript_request_validation() {
        let ok: TranscriptRequest =
            serde_json::from_str(r#"{"meetingId":"m1","text":"hello"}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.speaker_or_default(), DEFAULT_TRANSCRIPT_SPEAKER);

        let no_text: TranscriptRequest =
            serde_json::from_str(r#"{"meetingId":"m1","text":""}"#).unwrap();
        assert_eq!(no_text.validate(), Err("text must not be blank"));

        let no_meeting: TranscriptRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(no_meeting.validate(), Err("meetingId must not be blank"));
    }

    #[test]
    fn test_transcript_request_uses_given_speaker() {
        let req: TranscriptRequest =
            serde_json::from_str(r#"{"meetingId":"m1","speaker":"Ana","text":"hi"}"#).unwrap();
        assert_eq!(req.speaker_or_default(), "Ana");
    }
}
