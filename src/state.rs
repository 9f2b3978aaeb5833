//! Packed search state and its canonical form.
//!
//! A search state is the remaining brick inventory, the seams bridged so far
//! and the number of rows still to place. It is packed into a single `u128`
//! so that equality and hashing are plain integer operations.
//!
//! Layout (low to high bits):
//! - bits 0..100: 20 type slots of 5 bits each, holding remaining counts.
//!   Slots are shared by the four length classes, which occupy consecutive
//!   runs: length 1 first, then 2, 3 and 4.
//! - bits 100..120: end index (exclusive) of each length class, 5 bits each.
//! - bits 120..123: bridged seams (left, middle, right).
//! - bits 123..128: remaining rows.
//!
//! Unused slots are always zero, so two states compare equal exactly when
//! their words do. Canonicalization sorts each class by descending count and
//! drops empty types, which lets logically identical states share one memo
//! entry.

use std::fmt;
use std::ops::Range;

use crate::pieces::{PieceLength, PieceSet, TypeCounts, MAX_TYPES_PER_LENGTH};

/// Total number of type slots in the packed state.
pub const POOL_SLOTS: usize = 4 * MAX_TYPES_PER_LENGTH;

/// Largest value a remaining-rows field can hold.
pub const MAX_REMAINING_ROWS: u8 = 31;

const FIELD_BITS: u32 = 5;
const FIELD_MASK: u128 = (1 << FIELD_BITS) - 1;

const ENDS_SHIFT: u32 = POOL_SLOTS as u32 * FIELD_BITS;
const FLAGS_SHIFT: u32 = ENDS_SHIFT + 4 * FIELD_BITS;
const FLAGS_MASK: u128 = 0b111;
const ROWS_SHIFT: u32 = FLAGS_SHIFT + 3;

const _: () = assert!(ROWS_SHIFT + FIELD_BITS == u128::BITS);

/// The three internal seams of a row, between its four unit columns.
///
/// A seam is bridged when some brick in some row spans it. Flags only ever
/// go from unset to set along a search path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundaryFlags {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl BoundaryFlags {
    pub const NONE: Self = Self::new(false, false, false);
    pub const ALL: Self = Self::new(true, true, true);
    pub const LEFT: Self = Self::new(true, false, false);
    pub const MIDDLE: Self = Self::new(false, true, false);
    pub const RIGHT: Self = Self::new(false, false, true);
    /// Left and right seams, as bridged by two length-2 bricks.
    pub const OUTER: Self = Self::new(true, false, true);

    pub const fn new(left: bool, middle: bool, right: bool) -> Self {
        Self {
            left,
            middle,
            right,
        }
    }

    /// Seams bridged by either set.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self::new(
            self.left || other.left,
            self.middle || other.middle,
            self.right || other.right,
        )
    }

    /// True when every seam is bridged.
    #[inline]
    pub const fn all(self) -> bool {
        self.left && self.middle && self.right
    }

    #[inline]
    const fn bits(self) -> u8 {
        self.left as u8 | (self.middle as u8) << 1 | (self.right as u8) << 2
    }

    #[inline]
    const fn from_bits(bits: u8) -> Self {
        Self::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0)
    }
}

/// Unpacked view of a search state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Remaining count of each type, indexed by `PieceLength::index()`.
    pub classes: [TypeCounts; 4],
    pub flags: BoundaryFlags,
    pub remaining_rows: u8,
}

impl SearchState {
    /// Initial state for a query: nothing bridged yet.
    pub fn new(pieces: &PieceSet, remaining_rows: u8) -> Self {
        Self {
            classes: pieces.classes().clone(),
            flags: BoundaryFlags::NONE,
            remaining_rows,
        }
    }

    /// Sorts each class by descending count and drops empty types.
    pub fn canonicalize(&mut self) {
        for class in &mut self.classes {
            class.retain(|count| *count != 0);
            class.sort_unstable_by(|a, b| b.cmp(a));
        }
    }

    /// Packs this state into a single word.
    pub fn encode(&self) -> PackedState {
        debug_assert!(self.remaining_rows <= MAX_REMAINING_ROWS);

        let mut packed = PackedState(0);
        let mut slot = 0;
        for (class, counts) in self.classes.iter().enumerate() {
            for &count in counts {
                packed = packed.with_count(slot, count);
                slot += 1;
            }
            packed = packed.with_field(ENDS_SHIFT + class as u32 * FIELD_BITS, slot as u8);
        }

        packed
            .with_flags(self.flags)
            .with_remaining_rows(self.remaining_rows)
    }
}

/// A search state packed into one `u128`. See the module docs for the layout.
///
/// `Eq` and `Hash` work on the whole word, so only canonical states should be
/// used as memo keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedState(u128);

impl PackedState {
    /// The raw packed word.
    #[inline]
    pub const fn bits(self) -> u128 {
        self.0
    }

    #[inline]
    fn field(self, shift: u32) -> u8 {
        ((self.0 >> shift) & FIELD_MASK) as u8
    }

    #[inline]
    fn with_field(self, shift: u32, value: u8) -> Self {
        debug_assert!(value as u128 <= FIELD_MASK, "field overflow: {value}");
        Self((self.0 & !(FIELD_MASK << shift)) | ((value as u128) << shift))
    }

    /// Remaining count in a type slot.
    #[inline]
    pub fn count(self, slot: usize) -> u8 {
        debug_assert!(slot < POOL_SLOTS);
        self.field(slot as u32 * FIELD_BITS)
    }

    #[inline]
    fn with_count(self, slot: usize, count: u8) -> Self {
        debug_assert!(slot < POOL_SLOTS);
        self.with_field(slot as u32 * FIELD_BITS, count)
    }

    #[inline]
    fn class_end(self, class: usize) -> usize {
        self.field(ENDS_SHIFT + class as u32 * FIELD_BITS) as usize
    }

    /// Slots holding the types of one brick length.
    #[inline]
    pub fn class_range(self, length: PieceLength) -> Range<usize> {
        let class = length.index();
        let start = if class == 0 {
            0
        } else {
            self.class_end(class - 1)
        };
        start..self.class_end(class)
    }

    /// True when the class has at least one type slot.
    ///
    /// On a canonical state this means at least one brick of that length.
    #[inline]
    pub fn has_types(self, length: PieceLength) -> bool {
        !self.class_range(length).is_empty()
    }

    #[inline]
    pub fn flags(self) -> BoundaryFlags {
        BoundaryFlags::from_bits(((self.0 >> FLAGS_SHIFT) & FLAGS_MASK) as u8)
    }

    #[inline]
    pub fn with_flags(self, flags: BoundaryFlags) -> Self {
        Self((self.0 & !(FLAGS_MASK << FLAGS_SHIFT)) | ((flags.bits() as u128) << FLAGS_SHIFT))
    }

    /// Marks additional seams as bridged, keeping those already set.
    #[inline]
    pub fn bridge(self, seams: BoundaryFlags) -> Self {
        self.with_flags(self.flags().union(seams))
    }

    #[inline]
    pub fn remaining_rows(self) -> u8 {
        self.field(ROWS_SHIFT)
    }

    #[inline]
    pub fn with_remaining_rows(self, rows: u8) -> Self {
        self.with_field(ROWS_SHIFT, rows)
    }

    /// Removes `amount` bricks from a type slot.
    #[inline]
    pub fn consume(self, slot: usize, amount: u8) -> Self {
        let count = self.count(slot);
        debug_assert!(count >= amount, "slot {slot} holds {count}, need {amount}");
        self.with_count(slot, count - amount)
    }

    /// Unpacks into the logical representation.
    pub fn decode(self) -> SearchState {
        let mut classes: [TypeCounts; 4] = Default::default();
        for length in PieceLength::ALL {
            classes[length.index()].extend(self.class_range(length).map(|slot| self.count(slot)));
        }

        SearchState {
            classes,
            flags: self.flags(),
            remaining_rows: self.remaining_rows(),
        }
    }

    /// Returns the unique representative of this state's equivalence class.
    ///
    /// Each class is sorted by descending count, empty types are removed and
    /// the following classes are shifted down to close the gap.
    pub fn canonicalize(self) -> Self {
        let mut state = self.decode();
        state.canonicalize();
        state.encode()
    }
}

impl fmt::Display for PackedState {
    /// Three lines: the count in every slot, the length class owning each
    /// slot (`x` when unused), then bridged seams and remaining rows.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = (0..POOL_SLOTS)
            .map(|slot| self.count(slot).to_string())
            .collect();
        writeln!(f, "{}", counts.join(" "))?;

        let mut owners = ['x'; POOL_SLOTS];
        for length in PieceLength::ALL {
            for slot in self.class_range(length) {
                owners[slot] = char::from(b'0' + length.units() as u8);
            }
        }
        let owners: Vec<String> = owners.iter().map(char::to_string).collect();
        writeln!(f, "{}", owners.join(" "))?;

        let flags = self.flags();
        let seam = |bridged: bool| if bridged { '#' } else { '.' };
        write!(
            f,
            "seams {}{}{} rows {}",
            seam(flags.left),
            seam(flags.middle),
            seam(flags.right),
            self.remaining_rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pairs: &[(u32, u32)], flags: BoundaryFlags, rows: u8) -> SearchState {
        let pieces = PieceSet::from_pairs(pairs.iter().copied()).unwrap();
        SearchState {
            flags,
            ..SearchState::new(&pieces, rows)
        }
    }

    #[test]
    fn test_fields_fill_the_whole_word() {
        let mut full = SearchState::default();
        for class in &mut full.classes {
            for _ in 0..MAX_TYPES_PER_LENGTH {
                class.push(31);
            }
        }
        full.flags = BoundaryFlags::ALL;
        full.remaining_rows = MAX_REMAINING_ROWS;

        let bits = full.encode().bits();
        assert_eq!(bits & ((1 << ENDS_SHIFT) - 1), (1 << ENDS_SHIFT) - 1);
        assert_eq!(bits >> FLAGS_SHIFT, 0xff);
        assert_eq!(full.encode().decode(), full);
        assert_eq!(SearchState::default().encode().bits(), 0);
    }

    #[test]
    fn test_decode_restores_fields() {
        let original = state(&[(3, 1), (0, 1), (2, 2), (7, 4)], BoundaryFlags::OUTER, 9);
        let packed = original.encode();

        assert_eq!(packed.decode(), original);
        assert_eq!(packed.class_range(PieceLength::One), 0..2);
        assert_eq!(packed.class_range(PieceLength::Two), 2..3);
        assert_eq!(packed.class_range(PieceLength::Three), 3..3);
        assert_eq!(packed.class_range(PieceLength::Four), 3..4);
        assert!(!packed.has_types(PieceLength::Three));
        assert_eq!(packed.count(3), 7);
        assert_eq!(packed.flags(), BoundaryFlags::OUTER);
        assert_eq!(packed.remaining_rows(), 9);
    }

    #[test]
    fn test_bridge_keeps_existing_seams() {
        let packed = state(&[(1, 4)], BoundaryFlags::LEFT, 2).encode();

        let bridged = packed.bridge(BoundaryFlags::RIGHT);
        assert_eq!(bridged.flags(), BoundaryFlags::OUTER);
        assert_eq!(bridged.bridge(BoundaryFlags::MIDDLE).flags(), BoundaryFlags::ALL);
        assert_eq!(bridged.bridge(BoundaryFlags::NONE), bridged);
        // only the flag bits change
        assert_eq!(bridged.with_flags(BoundaryFlags::LEFT), packed);
    }

    #[test]
    fn test_consume_and_rows_leave_other_fields_untouched() {
        let packed = state(&[(5, 1), (4, 2), (3, 3)], BoundaryFlags::MIDDLE, 4).encode();
        let next = packed.consume(1, 2).with_remaining_rows(3);

        assert_eq!(next.count(0), 5);
        assert_eq!(next.count(1), 2);
        assert_eq!(next.count(2), 3);
        assert_eq!(next.flags(), BoundaryFlags::MIDDLE);
        assert_eq!(next.remaining_rows(), 3);
        assert_eq!(next.class_range(PieceLength::Three), 2..3);
    }

    #[test]
    fn test_canonical_form_is_order_insensitive() {
        let a = state(&[(3, 1), (2, 1), (1, 2), (4, 2)], BoundaryFlags::NONE, 5);
        let b = state(&[(2, 1), (3, 1), (4, 2), (1, 2)], BoundaryFlags::NONE, 5);

        assert_ne!(a.encode(), b.encode());
        assert_eq!(a.encode().canonicalize(), b.encode().canonicalize());
    }

    #[test]
    fn test_canonical_form_drops_empty_types_and_compacts() {
        let sparse = state(&[(0, 1), (2, 1), (0, 2), (1, 3), (0, 4), (6, 4)], BoundaryFlags::RIGHT, 3);
        let dense = state(&[(2, 1), (1, 3), (6, 4)], BoundaryFlags::RIGHT, 3);

        let canonical = sparse.encode().canonicalize();
        assert_eq!(canonical, dense.encode());
        assert_eq!(canonical.class_range(PieceLength::One), 0..1);
        assert_eq!(canonical.class_range(PieceLength::Two), 1..1);
        assert_eq!(canonical.class_range(PieceLength::Three), 1..2);
        assert_eq!(canonical.class_range(PieceLength::Four), 2..3);
        // nothing left behind in the freed slots
        assert!((3..POOL_SLOTS).all(|slot| canonical.count(slot) == 0));
    }

    #[test]
    fn test_consumed_type_disappears_after_canonicalize() {
        let packed = state(&[(1, 2), (3, 2), (2, 4)], BoundaryFlags::NONE, 2)
            .encode()
            .canonicalize();
        // canonical order puts the 3 first, the 1 second
        let emptied = packed.consume(1, 1).canonicalize();

        assert_eq!(emptied.class_range(PieceLength::Two), 0..1);
        assert_eq!(emptied.count(0), 3);
        assert_eq!(emptied.count(1), 2);
        assert_eq!(emptied.class_range(PieceLength::Four), 1..2);
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let inputs = [
            state(&[(4, 1), (0, 1), (9, 1)], BoundaryFlags::NONE, 1),
            state(&[(1, 2), (1, 2), (2, 3), (0, 3), (5, 4)], BoundaryFlags::ALL, 30),
            state(&[], BoundaryFlags::MIDDLE, 0),
        ];
        for input in inputs {
            let once = input.encode().canonicalize();
            assert_eq!(once.canonicalize(), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_flags_and_rows_distinguish_states() {
        let base = state(&[(2, 2)], BoundaryFlags::NONE, 3).encode();
        assert_ne!(base, base.with_flags(BoundaryFlags::LEFT));
        assert_ne!(base, base.with_remaining_rows(2));
    }

    #[test]
    fn test_display() {
        let packed = state(&[(3, 1), (2, 2), (1, 4)], BoundaryFlags::OUTER, 4).encode();
        let expected = "3 2 1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n\
                        1 2 4 x x x x x x x x x x x x x x x x x\n\
                        seams #.# rows 4";
        assert_eq!(packed.to_string(), expected);
    }
}
