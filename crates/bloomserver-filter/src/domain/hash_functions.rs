//! Hash functions for the Bloom filter
//!
//! One MurmurHash3 x64_128 pass per item. The low and high 64-bit halves
//! feed double hashing: position(i) = (h1 + i * h2) mod m.
//!
//! The scheme is part of the on-disk contract: filter files are only
//! portable between builds that derive positions exactly this way.

use std::io::Cursor;

/// Seed for the MurmurHash3 pass
pub const HASH_SEED: u32 = 0;

/// Hash an element with MurmurHash3 x64_128, split into two 64-bit halves
pub fn murmur_hash_pair(element: &[u8]) -> (u64, u64) {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, HASH_SEED).unwrap_or(0);
    (hash as u64, (hash >> 64) as u64)
}

/// Iterator over the `k` bit positions of an element
#[derive(Clone, Debug)]
pub struct HashPositions {
    h1: u64,
    h2: u64,
    m: u64,
    next: u64,
    k: u64,
}

impl Iterator for HashPositions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.k {
            return None;
        }
        let hash = self.h1.wrapping_add(self.next.wrapping_mul(self.h2));
        self.next += 1;
        Some((hash % self.m) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HashPositions {}

/// Compute the k bit positions for an element in a filter of m bits
///
/// `m` must be non-zero; `BloomFilter` guarantees it.
pub fn hash_positions(element: &[u8], k: u64, m: u64) -> HashPositions {
    let (h1, h2) = murmur_hash_pair(element);
    HashPositions {
        h1,
        h2,
        m,
        next: 0,
        k,
    }
}
