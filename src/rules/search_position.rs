//! Contract between the search and the game-rules library it drives.
//!
//! The search never looks inside a position. It advances and retreats one
//! shared, mutable position through `make_move` / `unmake_move` and asks the
//! rules layer for legal moves, terminal state, a hash key and the handful of
//! per-move facts that move ordering needs.

use std::fmt;

/// Side to move, used only for the evaluator's sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// `+1` for the first player, `-1` for the second.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Side::First => 1,
            Side::Second => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns. The king is never captured, so it
    /// carries no material weight.
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }
}

/// What a move does, as far as move ordering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTraits {
    pub moved: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
}

impl MoveTraits {
    #[inline]
    pub const fn quiet(moved: PieceKind) -> Self {
        Self {
            moved,
            captured: None,
            promotion: None,
        }
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// A position the search can walk with make/unmake.
///
/// `unmake_move(mv)` must exactly undo the preceding `make_move(mv)`: hash,
/// side to move, clocks and repetition history included. Every search frame
/// relies on that to leave the position as it found it.
pub trait SearchPosition {
    type Move: Copy + Eq + fmt::Debug + fmt::Display;

    fn make_move(&mut self, mv: Self::Move);
    fn unmake_move(&mut self, mv: Self::Move);

    /// Finite enumeration of legal moves; only captures when `captures_only`.
    fn legal_moves(&self, captures_only: bool) -> Vec<Self::Move>;

    fn is_in_check(&self) -> bool;

    fn is_in_checkmate(&self) -> bool {
        self.is_in_check() && self.legal_moves(false).is_empty()
    }

    /// Repetition, fifty-move rule or insufficient material.
    fn is_draw(&self) -> bool;

    fn position_hash(&self) -> u64;
    fn side_to_move(&self) -> Side;

    fn move_traits(&self, mv: Self::Move) -> MoveTraits;

    /// Whether the opponent attacks the destination square of `mv` in the
    /// current position.
    fn is_target_attacked(&self, mv: Self::Move) -> bool;
}
