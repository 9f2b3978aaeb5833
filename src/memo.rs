//! Memo tables for the wall search.
//!
//! A memo maps a canonical `PackedState` to the number of walls that can be
//! completed from it. One memo serves a single query and is cleared before
//! the next.

use rustc_hash::FxHashMap;

use crate::state::PackedState;

/// Lookup and miss counters for one query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub lookups: u64,
    pub misses: u64,
}

impl MemoStats {
    /// Fraction of lookups that had to be computed, in percent.
    pub fn miss_ratio(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.misses as f64 / self.lookups as f64 * 100.0
        }
    }
}

/// Storage consulted by the search before expanding a state.
pub trait MemoStore {
    /// Returns the stored count for a canonical state.
    fn get(&mut self, state: PackedState) -> Option<u64>;

    /// Records the count for a canonical state.
    fn put(&mut self, state: PackedState, count: u64);

    /// Drops all entries and resets the statistics.
    fn clear(&mut self);

    fn stats(&self) -> MemoStats;
}

/// Hash map memo keyed on the packed word.
#[derive(Debug, Default)]
pub struct FxMemo {
    entries: FxHashMap<PackedState, u64>,
    stats: MemoStats,
}

impl FxMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MemoStore for FxMemo {
    #[inline]
    fn get(&mut self, state: PackedState) -> Option<u64> {
        self.stats.lookups += 1;
        let hit = self.entries.get(&state).copied();
        if hit.is_none() {
            self.stats.misses += 1;
        }
        hit
    }

    #[inline]
    fn put(&mut self, state: PackedState, count: u64) {
        let previous = self.entries.insert(state, count);
        debug_assert!(previous.is_none(), "state stored twice");
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.stats = MemoStats::default();
    }

    fn stats(&self) -> MemoStats {
        self.stats
    }
}

/// A memo that remembers nothing; every state is recomputed.
#[derive(Debug, Default)]
pub struct NoMemo {
    stats: MemoStats,
}

impl MemoStore for NoMemo {
    #[inline]
    fn get(&mut self, _state: PackedState) -> Option<u64> {
        self.stats.lookups += 1;
        self.stats.misses += 1;
        None
    }

    #[inline]
    fn put(&mut self, _state: PackedState, _count: u64) {}

    fn clear(&mut self) {
        self.stats = MemoStats::default();
    }

    fn stats(&self) -> MemoStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceSet;
    use crate::state::SearchState;

    fn key(rows: u8) -> PackedState {
        let pieces = PieceSet::from_pairs([(2, 1), (1, 4)]).unwrap();
        SearchState::new(&pieces, rows).encode()
    }

    #[test]
    fn test_fx_memo_returns_stored_count() {
        let mut memo = FxMemo::new();
        assert_eq!(memo.get(key(3)), None);

        memo.put(key(3), 42);
        assert_eq!(memo.get(key(3)), Some(42));
        assert_eq!(memo.get(key(2)), None);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.stats(), MemoStats { lookups: 3, misses: 2 });
    }

    #[test]
    fn test_clear_resets_entries_and_stats() {
        let mut memo = FxMemo::new();
        memo.put(key(1), 7);
        memo.get(key(1));

        memo.clear();
        assert!(memo.is_empty());
        assert_eq!(memo.stats(), MemoStats::default());
        assert_eq!(memo.get(key(1)), None);
    }

    #[test]
    fn test_no_memo_never_hits() {
        let mut memo = NoMemo::default();
        memo.put(key(1), 7);
        assert_eq!(memo.get(key(1)), None);
        assert_eq!(memo.stats().miss_ratio(), 100.0);
    }

    #[test]
    fn test_miss_ratio() {
        assert_eq!(MemoStats::default().miss_ratio(), 0.0);
        let stats = MemoStats { lookups: 8, misses: 2 };
        assert_eq!(stats.miss_ratio(), 25.0);
    }
}
