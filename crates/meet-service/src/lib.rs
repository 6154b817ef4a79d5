//! Meet Service Library
//!
//! Server-side coordination for ad-hoc video meetings:
//!
//! - Meeting creation and lookup
//! - Per-room admission control against a participant limit
//! - Signaling relay between the participants of a room
//! - Per-meeting transcript files
//!
//! Media never passes through this service. Clients negotiate peer
//! connections through the signaling relay and exchange media directly.
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! All room state lives in memory for the lifetime of the process.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP and WebSocket handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Domain types and API bodies
//! - `observability` - Metrics and health endpoints
//! - `repositories` - Meeting store and participant registry
//! - `routes` - Axum router setup
//! - `services` - Room sessions facade, signaling relay, transcripts

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
