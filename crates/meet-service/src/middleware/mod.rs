//! HTTP middleware for the Meet Service.

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
