//! Service layer for the Meet Service.
//!
//! - `room_sessions` - facade over meetings, rooms and signaling
//! - `signaling_relay` - per-meeting publish/subscribe fan-out
//! - `transcripts` - per-meeting transcript files

pub mod room_sessions;
pub mod signaling_relay;
pub mod transcripts;

pub use room_sessions::{JoinOutcome, LeaveOutcome, RoomSessions, RoomSnapshot};
pub use signaling_relay::{Envelope, SignalingRelay, Subscription};
pub use transcripts::TranscriptService;
