//! Repository layer for the Meet Service.
//!
//! In-memory registries behind explicit synchronized operations, following
//! the Handler -> Service -> Repository architecture. Nothing here performs
//! I/O or awaits while holding a lock.

pub mod meetings;
pub mod participants;

pub use meetings::MeetingStore;
pub use participants::ParticipantRegistry;
