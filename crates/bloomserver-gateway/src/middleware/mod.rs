//! Middleware for the query gateway.
//!
//! Layer order: Request → Tracing → Handler

pub mod metrics;
pub mod tracing;

pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use tracing::TracingLayer;
