//! Ports
//!
//! The scanner only needs to ask "is this item in the set?". Anything that
//! can answer that is a `MembershipTest`: the Bloom filter in production, an
//! exact set in tests.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Read-only membership test over byte strings
pub trait MembershipTest: Send + Sync {
    /// Whether `item` tests positive
    fn test(&self, item: &[u8]) -> bool;
}

impl<T: MembershipTest + ?Sized> MembershipTest for &T {
    fn test(&self, item: &[u8]) -> bool {
        (**self).test(item)
    }
}

impl<T: MembershipTest + ?Sized> MembershipTest for Arc<T> {
    fn test(&self, item: &[u8]) -> bool {
        (**self).test(item)
    }
}

impl MembershipTest for HashSet<Vec<u8>> {
    fn test(&self, item: &[u8]) -> bool {
        self.contains(item)
    }
}

impl MembershipTest for BTreeSet<Vec<u8>> {
    fn test(&self, item: &[u8]) -> bool {
        self.contains(item)
    }
}
