//! Domain Layer - Pure logic
//!
//! This layer contains:
//! - Core Bloom filter implementation
//! - Hash position derivation
//! - Parameter estimation
//! - Substring scanner
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bloom_filter;
pub mod hash_functions;
pub mod parameters;
pub mod scanner;

pub use bloom_filter::BloomFilter;
pub use parameters::{calculate_fpr, estimate_parameters, FilterParameters};
pub use scanner::{ScanRequest, ScanResult, SubstringScanner};
