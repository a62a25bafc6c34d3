//! Visited-object registry.
//!
//! Groups reachable through more than one hard link are recorded by address
//! the first time they are descended into, so a second encounter (including
//! one through a cycle) does not recurse again.

use std::collections::HashMap;

/// Tracks multiply-linked objects for the duration of one traversal.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    visits: HashMap<u64, u32>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the object at `address` was already descended into
    /// and must be skipped.
    ///
    /// Objects with a single hard link are never recorded. For a multiply
    /// referenced object the first call records it and returns `false`; every
    /// later call returns `true`.
    pub fn record_if_multiply_referenced(&mut self, address: u64, reference_count: u32) -> bool {
        if reference_count <= 1 {
            return false;
        }
        let visits = self.visits.entry(address).or_insert(0);
        if *visits > 0 {
            return true;
        }
        *visits += 1;
        false
    }

    /// Number of recorded addresses.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
