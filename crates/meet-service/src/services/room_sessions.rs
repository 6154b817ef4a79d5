//! Room session facade.
//!
//! The single entry point the transport layer calls. Owns the meeting store,
//! the participant registry and the signaling relay, and checks that a
//! meeting exists before touching its room state so that an unknown meeting
//! is reported distinctly from a full room.

use crate::models::{Meeting, ParticipantLimit};
use crate::repositories::participants::Admission;
use crate::repositories::{MeetingStore, ParticipantRegistry};
use crate::services::signaling_relay::{Envelope, SignalingRelay, Subscription};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Outcome of [`RoomSessions::try_join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The client is a member. Carries a snapshot taken after the join.
    Admitted {
        participants: BTreeSet<String>,
        limit: ParticipantLimit,
    },
    /// Admission control rejected the client.
    RoomFull,
    /// No such meeting.
    MeetingNotFound,
}

impl JoinOutcome {
    /// Short label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinOutcome::Admitted { .. } => "admitted",
            JoinOutcome::RoomFull => "room_full",
            JoinOutcome::MeetingNotFound => "meeting_not_found",
        }
    }
}

/// Outcome of [`RoomSessions::leave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Membership after the leave.
    Left { participants: BTreeSet<String> },
    /// No such meeting.
    MeetingNotFound,
}

/// Read-only copy of a room's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub meeting: Meeting,
    pub participants: BTreeSet<String>,
    pub limit: ParticipantLimit,
    pub subscribers: usize,
}

/// Meetings, their rooms and their signaling topics.
#[derive(Debug)]
pub struct RoomSessions {
    meetings: MeetingStore,
    participants: ParticipantRegistry,
    relay: Arc<SignalingRelay>,
    default_limit: Option<u32>,
}

impl RoomSessions {
    /// Create an empty registry.
    ///
    /// `default_limit` is applied to every new meeting; `signaling_buffer`
    /// is the per-channel outbound queue depth.
    pub fn new(default_limit: Option<u32>, signaling_buffer: usize) -> Self {
        Self {
            meetings: MeetingStore::new(),
            participants: ParticipantRegistry::new(),
            relay: Arc::new(SignalingRelay::new(signaling_buffer)),
            default_limit,
        }
    }

    pub fn create(&self) -> Meeting {
        let meeting = self.meetings.create();

        if let Some(limit) = self.default_limit {
            self.participants.set_limit(&meeting.id, i64::from(limit));
        }

        info!(
            target: "meet.sessions",
            meeting_id = %meeting.id,
            default_limit = ?self.default_limit,
            "Meeting opened"
        );

        meeting
    }

    pub fn get(&self, id: &str) -> Option<Meeting> {
        self.meetings.get(id)
    }

    /// Set a room's limit, clamped to at least 1. `None` if the meeting is
    /// unknown.
    pub fn set_limit(&self, id: &str, requested: i64) -> Option<ParticipantLimit> {
        if !self.meetings.contains(id) {
            return None;
        }
        Some(self.participants.set_limit(id, requested))
    }

    /// A room's limit; unbounded if never set or the meeting is unknown.
    pub fn get_limit(&self, id: &str) -> ParticipantLimit {
        self.participants.get_limit(id)
    }

    pub fn try_join(&self, id: &str, client_id: &str) -> JoinOutcome {
        if !self.meetings.contains(id) {
            return JoinOutcome::MeetingNotFound;
        }

        match self.participants.try_join(id, client_id) {
            Admission::Denied => JoinOutcome::RoomFull,
            Admission::Admitted | Admission::AlreadyMember => JoinOutcome::Admitted {
                participants: self.participants.participants(id),
                limit: self.participants.get_limit(id),
            },
        }
    }

    pub fn leave(&self, id: &str, client_id: &str) -> LeaveOutcome {
        if !self.meetings.contains(id) {
            return LeaveOutcome::MeetingNotFound;
        }

        self.participants.leave(id, client_id);
        LeaveOutcome::Left {
            participants: self.participants.participants(id),
        }
    }

    /// Snapshot of current members; empty for an unknown meeting.
    pub fn participants(&self, id: &str) -> BTreeSet<String> {
        self.participants.participants(id)
    }

    /// Full room state, or `None` if the meeting is unknown.
    pub fn snapshot(&self, id: &str) -> Option<RoomSnapshot> {
        let meeting = self.meetings.get(id)?;
        Some(RoomSnapshot {
            participants: self.participants.participants(id),
            limit: self.participants.get_limit(id),
            subscribers: self.relay.subscriber_count(id),
            meeting,
        })
    }

    /// Open a signaling channel on a known meeting.
    pub fn open_channel(&self, id: &str) -> Option<(Subscription, mpsc::Receiver<Envelope>)> {
        if !self.meetings.contains(id) {
            return None;
        }
        Some(self.relay.open(id))
    }

    pub fn subscriber_count(&self, id: &str) -> usize {
        self.relay.subscriber_count(id)
    }
}
