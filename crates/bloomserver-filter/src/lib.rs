//! # bloomserver-filter
//!
//! Probabilistic word-set screening: a Bloom filter that can be persisted to
//! disk bit-exact, and a scanner that reports every substring of a text that
//! tests positive against it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure logic, no I/O
//!   - `BloomFilter`: the bit array and its `(m, k)` parameters
//!   - `estimate_parameters`: sizing from expected item count and target FPR
//!   - `SubstringScanner`: ordered substring enumeration under a deadline
//!
//! - **Ports Layer** (`ports/`): `MembershipTest`, the seam the scanner
//!   tests candidates through
//!
//! - **Adapters Layer** (`adapters/`): `FilterStore`, the on-disk format
//!
//! - **Service Layer** (`service/`): offline maintenance operations
//!   (create, insert, estimate, show)
//!
//! ## Invariants
//!
//! - No false negatives: once inserted, `contains()` returns true forever.
//! - FPR ≈ (1 - e^(-kn/m))^k for `n` inserted items.
//! - `FilterStore::load(FilterStore::save(f))` reproduces `m`, `k` and the
//!   bit array byte for byte.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::time::{Duration, Instant};
//! use bloomserver_filter::{BloomFilter, FilterStore, ScanRequest, SubstringScanner};
//!
//! let mut filter = BloomFilter::new(1 << 16, 7)?;
//! filter.insert(b"ab");
//! FilterStore::save_to_path(&filter, "words.bloom")?;
//!
//! let filter = FilterStore::load_from_path("words.bloom")?;
//! let request = ScanRequest::new("abcd", 1, Instant::now() + Duration::from_secs(5));
//! let result = SubstringScanner::new(&filter).scan(&request)?;
//! assert!(result.matches.contains(&"ab".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{FilterStore, FILTER_MAGIC, HEADER_LEN};
pub use domain::{
    estimate_parameters, BloomFilter, FilterParameters, ScanRequest, ScanResult,
    SubstringScanner,
};
pub use error::{FilterError, ScanError, StoreError};
pub use ports::MembershipTest;
pub use service::{estimate, FilterEstimate, FilterMaintenance};
