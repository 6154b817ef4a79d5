//! # Meet Test Utilities
//!
//! Shared test utilities for the Meet Service.
//!
//! This crate provides:
//! - Server test harness (`TestMeetServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meet_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<()> {
//!     let server = TestMeetServer::spawn().await?;
//!     let meeting_id = server.create_meeting().await?;
//!
//!     let response = reqwest::get(&format!("{}/api/meetings/{}", server.url(), meeting_id))
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
