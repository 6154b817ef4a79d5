//! Meeting store.
//!
//! Owns the set of known meetings. Meetings are retained for the lifetime of
//! the process and never deleted.

use crate::models::Meeting;
use chrono::Utc;
use common::types::MeetingId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Registry of meetings created by this process.
#[derive(Debug, Default)]
pub struct MeetingStore {
    meetings: RwLock<HashMap<String, Meeting>>,
}

impl MeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a meeting with a fresh id and the current timestamp.
    pub fn create(&self) -> Meeting {
        let meeting = Meeting {
            id: MeetingId::new().to_string(),
            created_at: Utc::now(),
        };

        self.meetings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(meeting.id.clone(), meeting.clone());

        debug!(target: "meet.repo.meetings", meeting_id = %meeting.id, "Meeting created");

        meeting
    }

    /// Look up a meeting by id.
    pub fn get(&self, id: &str) -> Option<Meeting> {
        self.meetings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Whether a meeting with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.meetings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_get_returns_same_meeting() {
        let store = MeetingStore::new();
        let meeting = store.create();

        assert_eq!(store.get(&meeting.id), Some(meeting.clone()));
        assert!(store.contains(&meeting.id));
    }

    #[test]
    fn test_create_generates_distinct_ids() {
        let store = MeetingStore::new();
        let first = store.create();
        let second = store.create();

        assert_ne!(first.id, second.id);
        assert!(store.contains(&first.id));
        assert!(store.contains(&second.id));
    }

    #[test]
    fn test_get_unknown_returns_none() {
        let store = MeetingStore::new();
        assert_eq!(store.get("unknown-id"), None);
        assert!(!store.contains("unknown-id"));
    }

    #[test]
    fn test_created_at_is_stable() {
        let store = MeetingStore::new();
        let meeting = store.create();

        let before = Utc::now();
        let fetched = store.get(&meeting.id).unwrap();

        assert_eq!(fetched.created_at, meeting.created_at);
        assert!(fetched.created_at <= before);
    }
}
