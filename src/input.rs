//! Reading queries from text.
//!
//! The format is a stream of whitespace-separated integers:
//! - the number of queries
//! - repeat per query:
//!   - wall height and number of brick types
//!   - repeat per type: brick count and brick length (1 to 4)
//!
//! Anything after the last query is ignored.

use std::fs;
use std::path::Path;
use std::str::SplitAsciiWhitespace;

use crate::error::WallError;
use crate::pieces::{PieceSet, Query};

struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl Tokens<'_> {
    fn next_number(&mut self, expected: &'static str) -> Result<u32, WallError> {
        let token = self
            .inner
            .next()
            .ok_or(WallError::UnexpectedEnd { expected })?;
        token.parse().map_err(|_| WallError::InvalidNumber {
            expected,
            token: token.to_string(),
        })
    }
}

/// Parses every query in `text`.
pub fn parse_queries(text: &str) -> Result<Vec<Query>, WallError> {
    let mut tokens = Tokens {
        inner: text.split_ascii_whitespace(),
    };

    let query_count = tokens.next_number("query count")?;
    let mut queries = Vec::new();

    for _ in 0..query_count {
        let height = tokens.next_number("wall height")?;
        let type_count = tokens.next_number("brick type count")?;

        let mut pieces = PieceSet::new();
        for _ in 0..type_count {
            let count = tokens.next_number("brick count")?;
            let length = tokens.next_number("brick length")?;
            pieces.add(count, length)?;
        }

        queries.push(Query::new(height, pieces)?);
    }

    Ok(queries)
}

/// Reads and parses a query file.
pub fn read_queries(path: impl AsRef<Path>) -> Result<Vec<Query>, WallError> {
    let text = fs::read_to_string(path)?;
    parse_queries(&text)
}
