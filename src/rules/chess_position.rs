//! Standard chess as a `SearchPosition`, backed by the `chess` crate.
//!
//! `chess::Board` is a copy-make value with legal move generation and a
//! Zobrist key, but no game history. `ChessPosition` layers the pieces the
//! search needs on top: an undo stack for make/unmake, the halfmove clock,
//! and the hash history used for repetition detection.

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::errors::SearchError;
use crate::rules::search_position::{MoveTraits, PieceKind, SearchPosition, Side};

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const FIFTY_MOVE_PLIES: u16 = 100;

#[derive(Debug, Clone)]
struct UndoRecord {
    mv: ChessMove,
    board: Board,
    halfmove_clock: u16,
}

#[derive(Debug, Clone)]
pub struct ChessPosition {
    board: Board,
    halfmove_clock: u16,
    // Hash of every position reached, current one last.
    hash_history: Vec<u64>,
    undo_stack: Vec<UndoRecord>,
}

impl ChessPosition {
    pub fn from_board(board: Board) -> Self {
        Self {
            hash_history: vec![board.get_hash()],
            board,
            halfmove_clock: 0,
            undo_stack: Vec::new(),
        }
    }

    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, SearchError> {
        let board = Board::from_str(fen).map_err(|e| SearchError::InvalidFen {
            fen: fen.to_owned(),
            reason: format!("{e:?}"),
        })?;
        let mut position = Self::from_board(board);
        position.halfmove_clock = fen
            .split_whitespace()
            .nth(4)
            .and_then(|field| field.parse::<u16>().ok())
            .unwrap_or(0);
        Ok(position)
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Number of moves currently made on top of the constructed position.
    #[inline]
    pub fn moves_made(&self) -> usize {
        self.undo_stack.len()
    }

    /// Resolve long algebraic text ("e2e4", "e7e8q") against the legal moves.
    pub fn parse_uci_move(&self, text: &str) -> Result<ChessMove, SearchError> {
        MoveGen::new_legal(&self.board)
            .find(|mv| mv.to_string() == text)
            .ok_or_else(|| SearchError::IllegalMove(text.to_owned()))
    }

    pub fn apply_uci_move(&mut self, text: &str) -> Result<ChessMove, SearchError> {
        let mv = self.parse_uci_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }

    fn is_repetition(&self) -> bool {
        let Some((&current, earlier)) = self.hash_history.split_last() else {
            return false;
        };
        let window = usize::from(self.halfmove_clock).min(earlier.len());
        // Same side to move only: step back two plies at a time.
        earlier
            .iter()
            .rev()
            .take(window)
            .skip(1)
            .step_by(2)
            .any(|&hash| hash == current)
    }

    fn has_insufficient_material(&self) -> bool {
        let occupied = self.board.combined().popcnt();
        if occupied == 2 {
            return true;
        }
        let minors = *self.board.pieces(Piece::Knight) | *self.board.pieces(Piece::Bishop);
        occupied == 3 && minors.popcnt() == 1
    }

    fn is_capture(&self, mv: ChessMove) -> bool {
        self.move_traits(mv).is_capture()
    }

    fn attacked_by(&self, square: Square, attacker: Color) -> bool {
        let board = &self.board;
        let theirs = *board.color_combined(attacker);
        let occupied = *board.combined();

        // A pawn of the defending colour on `square` attacks exactly the
        // squares from which an attacking pawn would hit `square`.
        let pawns = *board.pieces(Piece::Pawn) & theirs;
        if chess::get_pawn_attacks(square, !attacker, pawns).popcnt() > 0 {
            return true;
        }
        let knights = *board.pieces(Piece::Knight) & theirs;
        if (chess::get_knight_moves(square) & knights).popcnt() > 0 {
            return true;
        }
        let kings = *board.pieces(Piece::King) & theirs;
        if (chess::get_king_moves(square) & kings).popcnt() > 0 {
            return true;
        }
        let queens = *board.pieces(Piece::Queen);
        let diagonal = (*board.pieces(Piece::Bishop) | queens) & theirs;
        if (chess::get_bishop_moves(square, occupied) & diagonal).popcnt() > 0 {
            return true;
        }
        let straight = (*board.pieces(Piece::Rook) | queens) & theirs;
        (chess::get_rook_moves(square, occupied) & straight).popcnt() > 0
    }
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::startpos()
    }
}

#[inline]
pub fn piece_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

#[inline]
pub fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

impl SearchPosition for ChessPosition {
    type Move = ChessMove;

    fn make_move(&mut self, mv: ChessMove) {
        let irreversible = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();
        self.undo_stack.push(UndoRecord {
            mv,
            board: self.board,
            halfmove_clock: self.halfmove_clock,
        });
        self.board = self.board.make_move_new(mv);
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        self.hash_history.push(self.board.get_hash());
    }

    fn unmake_move(&mut self, mv: ChessMove) {
        let Some(record) = self.undo_stack.pop() else {
            debug_assert!(false, "unmake_move({mv}) with an empty undo stack");
            return;
        };
        debug_assert_eq!(record.mv, mv, "unmake_move out of order");
        self.board = record.board;
        self.halfmove_clock = record.halfmove_clock;
        self.hash_history.pop();
    }

    fn legal_moves(&self, captures_only: bool) -> Vec<ChessMove> {
        let moves = MoveGen::new_legal(&self.board);
        if captures_only {
            moves.filter(|&mv| self.is_capture(mv)).collect()
        } else {
            moves.collect()
        }
    }

    #[inline]
    fn is_in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    #[inline]
    fn is_in_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    fn is_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_PLIES
            || self.is_repetition()
            || self.has_insufficient_material()
    }

    #[inline]
    fn position_hash(&self) -> u64 {
        self.board.get_hash()
    }

    #[inline]
    fn side_to_move(&self) -> Side {
        side_of(self.board.side_to_move())
    }

    fn move_traits(&self, mv: ChessMove) -> MoveTraits {
        let source = mv.get_source();
        let dest = mv.get_dest();
        let moved = self
            .board
            .piece_on(source)
            .map(piece_kind)
            .unwrap_or(PieceKind::Pawn);
        let captured = match self.board.piece_on(dest) {
            Some(piece) => Some(piece_kind(piece)),
            // En passant: a pawn changing file onto an empty square.
            None if moved == PieceKind::Pawn && source.get_file() != dest.get_file() => {
                Some(PieceKind::Pawn)
            }
            None => None,
        };
        MoveTraits {
            moved,
            captured,
            promotion: mv.get_promotion().map(piece_kind),
        }
    }

    fn is_target_attacked(&self, mv: ChessMove) -> bool {
        self.attacked_by(mv.get_dest(), !self.board.side_to_move())
    }
}
