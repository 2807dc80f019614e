//! Error definitions shared across library modules. The controller itself
//! reports through events and makes bad states unrepresentable; only the log
//! replay tokenizer has failure modes worth typing.
use crate::replay::Column;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Why a CANARY log line failed to tokenize. The reader resynchronizes on
/// its own; the error reports which column broke.
pub enum ReplayError {
    /// A token grew past its column width.
    #[error("token overflow in {column:?}")]
    Overflow { column: Column },

    /// A token ended before reaching the column's minimum width.
    #[error("short token in {column:?}")]
    Incomplete { column: Column },

    /// A line ended in the middle of a column.
    #[error("unexpected end of line in {column:?}")]
    UnexpectedNewline { column: Column },

    /// A column contained a character outside its numeric base.
    #[error("invalid character in {column:?}")]
    BadCharacter { column: Column },
}
