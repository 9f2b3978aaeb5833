//! Brick Wall Counter Library
//!
//! Counts the distinct walls of a given height that can be stacked from a
//! limited supply of bricks, where every row is exactly four units wide and
//! no vertical seam may run through the whole wall.

pub mod error;
pub mod input;
pub mod memo;
pub mod pieces;
pub mod solver;
pub mod state;

pub use error::WallError;
pub use memo::{FxMemo, MemoStats, MemoStore, NoMemo};
pub use pieces::{PieceLength, PieceSet, Query};
pub use solver::{count_walls, count_walls_with, Outcome};
