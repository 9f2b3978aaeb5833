//! Memoized wall counter.
//!
//! Counts the ways to stack `height` rows of width 4 from a brick inventory so
//! that each of the three internal seams is bridged by a brick in at least
//! one row. Rows are ordered left to right and bottom to top; bricks of the
//! same type are interchangeable, bricks of different types are not.
//!
//! Key optimizations:
//! - Whole search state packed into one `u128` (see `state`)
//! - Canonical states as memo keys, so permuted inventories share entries
//! - FxHashMap memo, cleared per query
//! - Same-type pairs counted once, distinct-type pairs counted with their
//!   ordering multiplicity instead of being enumerated twice

use log::{debug, trace};

use crate::memo::{FxMemo, MemoStats, MemoStore};
use crate::pieces::{PieceLength, Query, MAX_HEIGHT, ROW_WIDTH};
use crate::state::{BoundaryFlags, PackedState, SearchState};

/// Seams bridged by the length-2 brick in each placement of `1 + 1 + 2`:
/// `2 1 1`, `1 2 1` and `1 1 2`.
const SHORT_ROW_SEAMS: [BoundaryFlags; 3] = [
    BoundaryFlags::LEFT,
    BoundaryFlags::MIDDLE,
    BoundaryFlags::RIGHT,
];

/// Seams bridged by the length-3 brick in `3 1` and `1 3`.
const LONG_ROW_SEAMS: [BoundaryFlags; 2] = [
    BoundaryFlags::new(true, true, false),
    BoundaryFlags::new(false, true, true),
];

/// Result of one query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Number of walls, modulo 2^64.
    pub walls: u64,
    /// Memo activity while counting; empty when the query was infeasible.
    pub stats: MemoStats,
}

/// Counts the walls for one query with a fresh memo.
pub fn count_walls(query: &Query) -> u64 {
    count_walls_with(query, &mut FxMemo::new()).walls
}

/// Counts the walls for one query using the given memo.
///
/// The memo is cleared once the count is known, ready for the next query.
pub fn count_walls_with<M: MemoStore>(query: &Query, memo: &mut M) -> Outcome {
    assert!(
        query.height <= MAX_HEIGHT,
        "height {} does not fit the search state",
        query.height
    );

    let material = query.pieces.material();
    if material < ROW_WIDTH * query.height {
        trace!(
            "height {} needs {} units, only {} available",
            query.height,
            ROW_WIDTH * query.height,
            material
        );
        return Outcome {
            walls: 0,
            stats: MemoStats::default(),
        };
    }

    // the search takes one row off before looking at the state
    let rows = (query.height + 1) as u8;
    let initial = SearchState::new(&query.pieces, rows).encode();

    let walls = Search { memo: &mut *memo }.count(initial);

    let stats = memo.stats();
    debug!(
        "height {} material {}: {} walls ({}/{} memo misses)",
        query.height, material, walls, stats.misses, stats.lookups
    );

    memo.clear();
    Outcome { walls, stats }
}

/// Recursive enumerator over packed states.
pub struct Search<'m, M: MemoStore> {
    pub memo: &'m mut M,
}

impl<M: MemoStore> Search<'_, M> {
    /// Number of ways to finish the wall from `state`.
    ///
    /// `state` carries one more remaining row than rows still to place.
    pub fn count(&mut self, state: PackedState) -> u64 {
        let state = state.canonicalize();
        if let Some(count) = self.memo.get(state) {
            return count;
        }

        let count = self.place_row(state);
        self.memo.put(state, count);
        count
    }

    /// Tries every way to fill the next row and sums the completions.
    fn place_row(&mut self, state: PackedState) -> u64 {
        let rows = state.remaining_rows();
        debug_assert!(rows > 0, "search entered with no rows left");
        let state = state.with_remaining_rows(rows - 1);
        let seams = state.flags();

        if rows == 1 {
            return seams.all() as u64;
        }
        if cannot_finish(state) {
            return 0;
        }

        let ones = state.class_range(PieceLength::One);
        let twos = state.class_range(PieceLength::Two);
        let threes = state.class_range(PieceLength::Three);
        let fours = state.class_range(PieceLength::Four);

        let mut total = 0u64;
        let mut add = |count: u64, multiplicity: u64| {
            total = total.wrapping_add(count.wrapping_mul(multiplicity));
        };

        // 4
        for a in fours.clone() {
            add(self.count(state.consume(a, 1).bridge(BoundaryFlags::ALL)), 1);
        }

        // 1 3, 3 1
        for a in ones.clone() {
            for b in threes.clone() {
                let next = state.consume(a, 1).consume(b, 1);
                for bridged in LONG_ROW_SEAMS {
                    add(self.count(next.bridge(bridged)), 1);
                }
            }
        }

        // 2a 2a
        for a in twos.clone().filter(|&a| state.count(a) >= 2) {
            add(self.count(state.consume(a, 2).bridge(BoundaryFlags::OUTER)), 1);
        }

        // 2a 2b, 2b 2a
        for a in twos.clone() {
            for b in a + 1..twos.end {
                let next = state.consume(a, 1).consume(b, 1);
                add(self.count(next.bridge(BoundaryFlags::OUTER)), 2);
            }
        }

        // 1a 1a 2b in three placements
        for a in ones.clone().filter(|&a| state.count(a) >= 2) {
            for b in twos.clone() {
                let next = state.consume(a, 2).consume(b, 1);
                for bridged in SHORT_ROW_SEAMS {
                    add(self.count(next.bridge(bridged)), 1);
                }
            }
        }

        // 1a 1b 2c in six placements, paired by which seam the 2 bridges
        for a in ones.clone() {
            for b in a + 1..ones.end {
                for c in twos.clone() {
                    let next = state.consume(a, 1).consume(b, 1).consume(c, 1);
                    for bridged in SHORT_ROW_SEAMS {
                        add(self.count(next.bridge(bridged)), 2);
                    }
                }
            }
        }

        // 1 1 1 1, every ordered choice of types
        for a in ones.clone() {
            let after_a = state.consume(a, 1);
            for b in ones.clone().filter(|&b| after_a.count(b) > 0) {
                let after_b = after_a.consume(b, 1);
                for c in ones.clone().filter(|&c| after_b.count(c) > 0) {
                    let after_c = after_b.consume(c, 1);
                    for d in ones.clone().filter(|&d| after_c.count(d) > 0) {
                        add(self.count(after_c.consume(d, 1)), 1);
                    }
                }
            }
        }

        total
    }
}

/// Necessary conditions for completing a wall, checked on a canonical state
/// with at least one row still to place.
fn cannot_finish(state: PackedState) -> bool {
    let has = |length| state.has_types(length);
    let seams = state.flags();

    let only_ones = !has(PieceLength::Two) && !has(PieceLength::Three) && !has(PieceLength::Four);
    // single bricks bridge nothing
    if only_ones && !seams.all() {
        return true;
    }

    let no_ones = !has(PieceLength::One);
    // 2 2 leaves the middle seam open
    if no_ones && !has(PieceLength::Three) && !has(PieceLength::Four) && !seams.middle {
        return true;
    }

    // a 3 needs a 1 beside it
    no_ones && !has(PieceLength::Two) && !has(PieceLength::Four)
}
