//! Common utilities and types shared across Video Meet components.

#![warn(clippy::pedantic)]

/// Module for common data types
pub mod types;

/// Module for common configuration
pub mod config;

/// Module for tracing subscriber setup
pub mod logging;
