//! Brick definitions and query types.
//!
//! A wall is built from bricks of length 1 to 4. Bricks of one length are
//! grouped into types: bricks within a type are interchangeable, bricks of
//! different types are not (think of the type as a colour).

use arrayvec::ArrayVec;

use crate::error::WallError;

/// Width of every row, in units.
pub const ROW_WIDTH: u32 = 4;

/// Maximum number of distinct brick types per length.
pub const MAX_TYPES_PER_LENGTH: usize = 5;

/// Largest brick count a single type may hold (5-bit field in the packed state).
pub const MAX_TYPE_COUNT: u32 = 31;

/// Tallest wall that can be counted.
///
/// The search state stores `height + 1` remaining rows in a 5-bit field.
pub const MAX_HEIGHT: u32 = 30;

/// Remaining-count of every type of one brick length, in insertion order.
pub type TypeCounts = ArrayVec<u8, MAX_TYPES_PER_LENGTH>;

/// Length of a brick in units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceLength {
    One,
    Two,
    Three,
    Four,
}

impl PieceLength {
    /// All lengths, shortest first. This is also the order of the classes
    /// inside the packed search state.
    pub const ALL: [PieceLength; 4] = [
        PieceLength::One,
        PieceLength::Two,
        PieceLength::Three,
        PieceLength::Four,
    ];

    /// Converts a length in units to a `PieceLength`.
    pub fn from_units(units: u32) -> Result<Self, WallError> {
        match units {
            1 => Ok(PieceLength::One),
            2 => Ok(PieceLength::Two),
            3 => Ok(PieceLength::Three),
            4 => Ok(PieceLength::Four),
            _ => Err(WallError::InvalidLength { length: units }),
        }
    }

    /// Length in units.
    #[inline]
    pub const fn units(self) -> u32 {
        self.index() as u32 + 1
    }

    /// Zero-based class index (`units() - 1`).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceLength::One => 0,
            PieceLength::Two => 1,
            PieceLength::Three => 2,
            PieceLength::Four => 3,
        }
    }
}

/// The bricks available for one query, grouped by length.
///
/// Fixed capacity: at most `MAX_TYPES_PER_LENGTH` types per length and at
/// most `MAX_TYPE_COUNT` bricks per type. Both limits are checked on insert,
/// so a `PieceSet` always fits the packed search state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceSet {
    classes: [TypeCounts; 4],
}

impl PieceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new brick type holding `count` bricks of `length` units.
    pub fn add(&mut self, count: u32, length: u32) -> Result<(), WallError> {
        let length = PieceLength::from_units(length)?;
        if count > MAX_TYPE_COUNT {
            return Err(WallError::CountTooLarge { count });
        }

        self.classes[length.index()]
            .try_push(count as u8)
            .map_err(|_| WallError::TooManyTypes {
                length: length.units(),
            })
    }

    /// Builds a set from `(count, length)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, WallError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut set = Self::new();
        for (count, length) in pairs {
            set.add(count, length)?;
        }
        Ok(set)
    }

    /// Counts of every type of the given length.
    #[inline]
    pub fn types(&self, length: PieceLength) -> &[u8] {
        &self.classes[length.index()]
    }

    /// Total length of all bricks, in units.
    pub fn material(&self) -> u32 {
        PieceLength::ALL
            .iter()
            .map(|&length| {
                let bricks: u32 = self.types(length).iter().map(|&c| c as u32).sum();
                bricks * length.units()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.iter().all(|class| class.is_empty())
    }

    pub(crate) fn classes(&self) -> &[TypeCounts; 4] {
        &self.classes
    }
}

/// A single counting request: how many walls of `height` rows can be built
/// from `pieces`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub height: u32,
    pub pieces: PieceSet,
}

impl Query {
    pub fn new(height: u32, pieces: PieceSet) -> Result<Self, WallError> {
        if height > MAX_HEIGHT {
            return Err(WallError::HeightTooLarge { height });
        }
        Ok(Self { height, pieces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion() {
        for length in PieceLength::ALL {
            assert_eq!(PieceLength::from_units(length.units()).unwrap(), length);
        }
        assert!(matches!(
            PieceLength::from_units(0),
            Err(WallError::InvalidLength { length: 0 })
        ));
        assert!(matches!(
            PieceLength::from_units(5),
            Err(WallError::InvalidLength { length: 5 })
        ));
    }

    #[test]
    fn test_material_sums_length_times_count() {
        let set = PieceSet::from_pairs([(3, 1), (2, 1), (1, 2), (2, 3), (4, 4)]).unwrap();
        assert_eq!(set.material(), 3 + 2 + 2 + 6 + 16);
        assert_eq!(set.types(PieceLength::One), &[3, 2]);
        assert_eq!(set.types(PieceLength::Four), &[4]);
    }

    #[test]
    fn test_sixth_type_of_one_length_is_rejected() {
        let mut set = PieceSet::new();
        for _ in 0..MAX_TYPES_PER_LENGTH {
            set.add(1, 2).unwrap();
        }
        assert!(matches!(
            set.add(1, 2),
            Err(WallError::TooManyTypes { length: 2 })
        ));
        // other lengths still have room
        set.add(1, 3).unwrap();
    }

    #[test]
    fn test_count_and_height_limits() {
        let mut set = PieceSet::new();
        assert!(set.add(MAX_TYPE_COUNT, 1).is_ok());
        assert!(matches!(
            set.add(MAX_TYPE_COUNT + 1, 1),
            Err(WallError::CountTooLarge { count: 32 })
        ));

        assert!(Query::new(MAX_HEIGHT, set.clone()).is_ok());
        assert!(matches!(
            Query::new(MAX_HEIGHT + 1, set),
            Err(WallError::HeightTooLarge { height: 31 })
        ));
    }

    #[test]
    fn test_zero_count_types_are_kept() {
        let set = PieceSet::from_pairs([(0, 4)]).unwrap();
        assert!(!set.is_empty());
        assert_eq!(set.material(), 0);
    }
}
