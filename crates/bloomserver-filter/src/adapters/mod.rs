//! Adapters Layer - External connections
//!
//! - `FilterStore`: reads and writes the binary filter file format

pub mod file_store;

pub use file_store::{FilterStore, FILTER_MAGIC, HEADER_LEN};
