//! Domain types for the query gateway.

pub mod config;
pub mod error;

pub use config::{ConfigError, GatewayConfig, ListenAddress};
pub use error::{GatewayError, QueryError};
