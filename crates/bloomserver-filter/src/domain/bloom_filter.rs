//! Core Bloom filter implementation
//!
//! INVARIANTS:
//! - No false negatives: if inserted, contains() MUST return true
//! - Bits are only ever set, never cleared; the size never changes

use bitvec::prelude::*;

use super::hash_functions::hash_positions;
use super::parameters::{estimate_parameters, FilterParameters};
use crate::error::FilterError;
use crate::ports::MembershipTest;

/// Bloom filter for probabilistic membership testing
///
/// Bit `i` is stored in byte `i / 8` at bit `i % 8` (LSB first), which is
/// also the on-disk layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    params: FilterParameters,
}

impl BloomFilter {
    /// Create an empty filter of `m` bits indexed by `k` hash functions
    pub fn new(m: u64, k: u64) -> Result<Self, FilterError> {
        let params = FilterParameters::new(m, k)?;
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; m as usize],
            params,
        })
    }

    /// Create an empty filter sized for `expected_items` at `target_fpr`
    pub fn with_capacity(expected_items: u64, target_fpr: f64) -> Result<Self, FilterError> {
        let params = estimate_parameters(expected_items, target_fpr)?;
        Self::new(params.m, params.k)
    }

    /// Rebuild a filter from its packed bit array
    ///
    /// `raw` must hold exactly `ceil(m / 8)` bytes. Padding bits past `m`
    /// in the last byte are kept as-is so the bytes round-trip unchanged.
    pub fn from_raw_parts(params: FilterParameters, raw: Vec<u8>) -> Result<Self, FilterError> {
        let expected = params.byte_len();
        if raw.len() as u64 != expected {
            return Err(FilterError::InvalidParameter(format!(
                "bit array holds {} bytes, expected {} for M={}",
                raw.len(),
                expected,
                params.m
            )));
        }
        let mut bits = BitVec::<u8, Lsb0>::from_vec(raw);
        bits.truncate(params.m as usize);
        Ok(Self { bits, params })
    }

    /// Insert an element into the filter
    ///
    /// After insertion, `contains(element)` is guaranteed to return true.
    pub fn insert(&mut self, element: &[u8]) {
        for pos in hash_positions(element, self.params.k, self.params.m) {
            self.bits.set(pos, true);
        }
    }

    /// Test if an element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set
    pub fn contains(&self, element: &[u8]) -> bool {
        hash_positions(element, self.params.k, self.params.m).all(|pos| self.bits[pos])
    }

    /// The filter's `(m, k)`
    pub fn parameters(&self) -> FilterParameters {
        self.params
    }

    /// Filter size in bits
    pub fn size_bits(&self) -> u64 {
        self.params.m
    }

    /// Number of hash functions
    pub fn hash_count(&self) -> u64 {
        self.params.k
    }

    /// Number of bits currently set
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Expected false positive rate after `n` insertions
    pub fn false_positive_rate(&self, n: u64) -> f64 {
        self.params.false_positive_rate(n)
    }

    /// The packed bit array, `ceil(m / 8)` bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}

impl MembershipTest for BloomFilter {
    fn test(&self, item: &[u8]) -> bool {
        self.contains(item)
    }
}
