//! HTTP request handlers for the Meet Service.

pub mod meetings;
pub mod metrics;
pub mod rooms;
pub mod signaling;
pub mod transcripts;

pub use meetings::{create_meeting, get_meeting};
pub use metrics::metrics_handler;
pub use rooms::{get_room, join_room, leave_room, set_room_limit};
pub use signaling::signaling_socket;
pub use transcripts::{append_transcript, download_transcript};
