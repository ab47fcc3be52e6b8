//! # bloomserver-gateway
//!
//! HTTP query endpoint that screens request text against a loaded Bloom
//! filter.
//!
//! ## Endpoints
//!
//! - `GET /api/search?substringLength=<u16>` with the text as the body.
//!   Answers `200 {"guiltySubstrings":[...]}`; failures carry an empty body
//!   and one of 400, 408, 413 or 500.
//! - `GET /health` reports filter parameters and request counters.
//!
//! ## Layout
//!
//! - `domain/`: configuration, listen address resolution, error types
//! - `middleware/`: request tracing and counters
//! - `listener`: TCP and Unix socket binding
//! - `service`: router, handlers and the serving loop
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bloomserver_filter::FilterStore;
//! use bloomserver_gateway::{GatewayConfig, GatewayListener, QueryGatewayService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = Arc::new(FilterStore::load_from_path("words.bloom")?);
//! let config = GatewayConfig::default();
//! let address = config.resolve_listen_address()?;
//!
//! let listener = GatewayListener::bind(&address).await?;
//! let service = QueryGatewayService::new(config, filter)?;
//! service.serve(listener, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod listener;
pub mod middleware;
pub mod service;

pub use domain::{ConfigError, GatewayConfig, GatewayError, ListenAddress, QueryError};
pub use listener::GatewayListener;
pub use middleware::{GatewayMetrics, MetricsSnapshot};
pub use service::{QueryGatewayService, HEALTH_ROUTE, SEARCH_ROUTE};
