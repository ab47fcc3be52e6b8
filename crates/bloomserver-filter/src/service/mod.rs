//! Service Layer - Orchestration
//!
//! Maintenance operations that combine the domain filter with the file
//! store. The query path lives in `bloomserver-gateway`.

pub mod maintenance;

pub use maintenance::{estimate, FilterEstimate, FilterMaintenance};
