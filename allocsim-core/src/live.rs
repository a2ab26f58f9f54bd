//! Live-address tracking.
//!
//! The set of currently allocated addresses is the generator's only state.
//! Backed by a `BTreeSet` so iteration order is deterministic: "the first
//! live address" is always the smallest one, and seeded runs reproduce
//! byte-for-byte. The set never grows past the free threshold, so membership
//! cost stays trivial at every reachable size.

use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct LiveSet {
    inner: BTreeSet<u64>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, addr: u64) -> bool {
        self.inner.contains(&addr)
    }

    /// Inserts `addr`; returns false if it was already live.
    pub fn insert(&mut self, addr: u64) -> bool {
        self.inner.insert(addr)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes and returns the first live address in iteration order
    /// (the smallest), or `None` when nothing is live.
    pub fn take_first(&mut self) -> Option<u64> {
        self.inner.pop_first()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.inner.iter().copied()
    }
}
