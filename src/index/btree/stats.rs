//! Tree operation statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by a tree.
///
/// Atomic so that read-only operations (searches take `&self`) can still
/// record themselves. All updates use `Ordering::Relaxed`: each counter
/// only needs atomicity, not ordering against the others.
#[derive(Debug, Default)]
pub struct TreeStats {
    /// Searches started, including the ones done internally by insert.
    pub searches: AtomicU64,

    /// Keys newly stored.
    pub inserts: AtomicU64,

    /// Inserts of keys that were already present.
    pub duplicate_inserts: AtomicU64,

    /// Node splits at any level.
    pub splits: AtomicU64,

    /// Splits that reached the root and grew the tree by one level.
    pub root_splits: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_duplicate(&self) {
        self.duplicate_inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_split(&self) {
        self.splits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_root_split(&self) {
        self.root_splits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a non-atomic copy of the current counters.
    pub fn snapshot(&self) -> TreeStatsSnapshot {
        TreeStatsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            duplicate_inserts: self.duplicate_inserts.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.searches.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.duplicate_inserts.store(0, Ordering::Relaxed);
        self.splits.store(0, Ordering::Relaxed);
        self.root_splits.store(0, Ordering::Relaxed);
    }
}

impl Clone for TreeStats {
    fn clone(&self) -> Self {
        let s = self.snapshot();
        Self {
            searches: AtomicU64::new(s.searches),
            inserts: AtomicU64::new(s.inserts),
            duplicate_inserts: AtomicU64::new(s.duplicate_inserts),
            splits: AtomicU64::new(s.splits),
            root_splits: AtomicU64::new(s.root_splits),
        }
    }
}

/// A point-in-time copy of [`TreeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStatsSnapshot {
    pub searches: u64,
    pub inserts: u64,
    pub duplicate_inserts: u64,
    pub splits: u64,
    pub root_splits: u64,
}

impl TreeStatsSnapshot {
    /// Average splits per newly stored key (0.0 when nothing was stored).
    pub fn splits_per_insert(&self) -> f64 {
        if self.inserts == 0 {
            0.0
        } else {
            self.splits as f64 / self.inserts as f64
        }
    }
}

impl fmt::Display for TreeStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ searches: {}, inserts: {}, duplicates: {}, splits: {}, root_splits: {} }}",
            self.searches, self.inserts, self.duplicate_inserts, self.splits, self.root_splits
        )
    }
}
