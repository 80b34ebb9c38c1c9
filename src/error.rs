//! Error types for the Chess Master engine.
//!
//! Only malformed input is reported through [`ChessError`]. An illegal
//! move proposal is not an error: it comes back as a rejected
//! [`MoveOutcome`](crate::game::MoveOutcome).

use crate::types::Color;

/// Recoverable errors raised while parsing or constructing engine values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// A (row, column) pair outside the 0–7 board range.
    #[error("square out of range: row {row}, column {col}")]
    OutOfRange { row: i32, col: i32 },

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid piece symbol: {0}")]
    InvalidPiece(String),

    /// A history entry that does not follow `<glyph><square> to <square>`.
    #[error("invalid history entry: {0}")]
    InvalidNotation(String),

    #[error("position has no {0} king")]
    MissingKing(Color),

    #[error("position has more than one {0} king")]
    DuplicateKing(Color),

    /// The side that just moved is still in check.
    #[error("the {0} king is in check but it is not {0}'s move")]
    OpponentInCheck(Color),

    /// A replayed history entry that the engine refused.
    #[error("move {index} ({entry}) was rejected: {reason}")]
    ReplayRejected {
        index: usize,
        entry: String,
        reason: String,
    },
}
