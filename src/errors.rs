//! Errors surfaced at the host-facing boundary of the engine.
//!
//! Search internals never fail: every node returns a plain score. Only the
//! entry points that accept external input (FEN text, UCI move text, engine
//! options, a root position to search) return `Result<_, SearchError>`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The FEN string could not be turned into a board.
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Move text does not name a legal move in the current position.
    #[error("illegal move '{0}'")]
    IllegalMove(String),

    /// `choose_move` was asked to move in a position that is already over.
    #[error("no legal moves in root position")]
    NoLegalMoves,

    /// An engine option was set to a value it cannot accept.
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },

    /// A protocol command was missing a required token.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
}

pub type EngineResult<T> = Result<T, SearchError>;
