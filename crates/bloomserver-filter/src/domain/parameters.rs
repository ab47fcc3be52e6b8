//! Bloom filter sizing
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- bits
//! - k = round((m/n) * ln(2))        -- hash functions, at least 1
//! - p ≈ (1 - e^(-kn/m))^k           -- expected false positive rate

use std::f64::consts::LN_2;
use std::fmt;

use bitvec::{order::Lsb0, slice::BitSlice};

use crate::error::FilterError;

/// Size and hash count of a filter, fixed at creation time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterParameters {
    /// Number of bits in the filter
    pub m: u64,
    /// Number of hash functions
    pub k: u64,
}

impl FilterParameters {
    /// Validate and build a parameter pair
    pub fn new(m: u64, k: u64) -> Result<Self, FilterError> {
        if m == 0 {
            return Err(FilterError::InvalidParameter(
                "bit array size (M) cannot be 0".to_string(),
            ));
        }
        if k == 0 {
            return Err(FilterError::InvalidParameter(
                "hash function count (K) cannot be 0".to_string(),
            ));
        }
        let max_bits = BitSlice::<u8, Lsb0>::MAX_BITS as u64;
        if usize::try_from(m).is_err() || m > max_bits {
            return Err(FilterError::InvalidParameter(format!(
                "bit array size (M) {} exceeds the address space (at most {})",
                m, max_bits
            )));
        }
        Ok(Self { m, k })
    }

    /// Bytes needed to hold `m` bits
    pub fn byte_len(&self) -> u64 {
        self.m.div_ceil(8)
    }

    /// Expected false positive rate after `n` insertions
    pub fn false_positive_rate(&self, n: u64) -> f64 {
        calculate_fpr(self.m, n, self.k)
    }
}

impl fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M (number of bits): {}, K (number of hash functions): {}",
            self.m, self.k
        )
    }
}

/// Estimate filter parameters for `n` expected items at false positive rate `p`
///
/// The exact `m` is returned; no rounding to word boundaries.
pub fn estimate_parameters(n: u64, p: f64) -> Result<FilterParameters, FilterError> {
    if n == 0 {
        return Err(FilterError::InvalidParameter(
            "expected number of entries cannot be 0".to_string(),
        ));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(FilterError::InvalidParameter(format!(
            "false positive rate {} must be strictly between 0 and 1",
            p
        )));
    }

    let n = n as f64;
    let m = (-n * p.ln() / (LN_2 * LN_2)).ceil();
    let k = ((m / n) * LN_2).round().max(1.0);

    FilterParameters::new(m as u64, k as u64)
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: u64, n: u64, k: u64) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powf(k as f64)
}
