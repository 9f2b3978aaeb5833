//! Errors raised while building or reading queries.
//!
//! The counting engine itself cannot fail; every limit it relies on is
//! checked here first.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WallError {
    #[error("brick length {length} is not between 1 and 4")]
    InvalidLength { length: u32 },

    #[error("more than 5 brick types of length {length}")]
    TooManyTypes { length: u32 },

    #[error("brick count {count} exceeds the maximum of 31 per type")]
    CountTooLarge { count: u32 },

    #[error("wall height {height} exceeds the maximum of 30")]
    HeightTooLarge { height: u32 },

    #[error("input ended while reading {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected a non-negative integer for {expected}, found {token:?}")]
    InvalidNumber {
        expected: &'static str,
        token: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
