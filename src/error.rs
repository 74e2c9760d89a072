use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("row {row} is out of range for {len} tracks")]
    OutOfRange { row: usize, len: usize },
    #[error("range {start}..{start}+{count} exceeds {len} tracks")]
    BadRange { start: usize, count: usize, len: usize },
    #[error("new order is not a permutation of {len} rows")]
    NotAPermutation { len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
