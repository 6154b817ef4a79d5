//! Participant registry.
//!
//! Owns, per meeting, the participant set and its capacity limit, and
//! enforces admission control.
//!
//! # Locking
//!
//! The outer map lock is held only long enough to find or create a
//! meeting's entry. Membership decisions run under that meeting's own
//! mutex, so joins to different meetings never contend with each other
//! while joins to the same meeting are linearizable.
//!
//! Lowering a limit never evicts existing members. It only blocks new joins
//! until enough members leave.

use crate::models::ParticipantLimit;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info};

/// Membership and limit of one meeting.
#[derive(Debug, Default)]
struct ParticipantSet {
    members: BTreeSet<String>,
    limit: ParticipantLimit,
}

/// Result of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Newly inserted.
    Admitted,
    /// Already a member; membership unchanged.
    AlreadyMember,
    /// Room at or over its limit; membership unchanged.
    Denied,
}

impl Admission {
    /// Whether the client is a member after the attempt.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        !matches!(self, Admission::Denied)
    }
}

/// Per-meeting participant sets with admission control.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<ParticipantSet>>>>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing entry for a meeting, if any.
    fn room(&self, id: &str) -> Option<Arc<Mutex<ParticipantSet>>> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Entry for a meeting, created empty if missing.
    fn room_or_create(&self, id: &str) -> Arc<Mutex<ParticipantSet>> {
        if let Some(room) = self.room(id) {
            return room;
        }

        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(rooms.entry(id.to_string()).or_default())
    }

    fn lock(room: &Mutex<ParticipantSet>) -> MutexGuard<'_, ParticipantSet> {
        room.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a limit for a meeting, clamped to at least 1.
    ///
    /// Creates an empty participant set if none exists yet. Returns the
    /// stored limit.
    pub fn set_limit(&self, id: &str, requested: i64) -> ParticipantLimit {
        let limit = ParticipantLimit::clamped(requested);
        let room = self.room_or_create(id);
        let mut set = Self::lock(&room);
        set.limit = limit;

        info!(
            target: "meet.repo.participants",
            meeting_id = %id,
            requested,
            limit = ?limit.as_option(),
            members = set.members.len(),
            "Participant limit set"
        );

        limit
    }

    /// Stored limit, or unbounded if none was ever set.
    pub fn get_limit(&self, id: &str) -> ParticipantLimit {
        self.room(id)
            .map(|room| Self::lock(&room).limit)
            .unwrap_or_default()
    }

    /// Atomically check capacity and insert `client_id`.
    ///
    /// A client that is already a member is admitted again without changing
    /// membership, even if the limit has since been lowered below the
    /// current size.
    pub fn try_join(&self, id: &str, client_id: &str) -> Admission {
        let room = self.room_or_create(id);
        let mut set = Self::lock(&room);

        let admission = if set.members.contains(client_id) {
            Admission::AlreadyMember
        } else if !set.limit.has_room_for_another(set.members.len()) {
            Admission::Denied
        } else {
            set.members.insert(client_id.to_string());
            Admission::Admitted
        };

        debug!(
            target: "meet.repo.participants",
            meeting_id = %id,
            client_id = %client_id,
            ?admission,
            members = set.members.len(),
            "Join evaluated"
        );

        admission
    }

    /// Remove `client_id` if present. Returns whether it was a member.
    pub fn leave(&self, id: &str, client_id: &str) -> bool {
        let Some(room) = self.room(id) else {
            return false;
        };

        let removed = Self::lock(&room).members.remove(client_id);

        debug!(
            target: "meet.repo.participants",
            meeting_id = %id,
            client_id = %client_id,
            removed,
            "Leave processed"
        );

        removed
    }

    /// Snapshot copy of current members; empty for an unknown meeting.
    pub fn participants(&self, id: &str) -> BTreeSet<String> {
        self.room(id)
            .map(|room| Self::lock(&room).members.clone())
            .unwrap_or_default()
    }
}
