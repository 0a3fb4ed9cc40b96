//! Pluggable static evaluation.
//!
//! The search depends only on `BoardScorer`: a deterministic, side-effect
//! free score of the current position from the side-to-move's perspective
//! (positive favours the player about to move). Scores are recomputed at
//! every call; nothing is cached.

use chess::{Board, Color, Piece, ALL_PIECES};

use crate::rules::chess_position::{piece_kind, side_of, ChessPosition};
use crate::rules::search_position::{PieceKind, SearchPosition};

pub trait BoardScorer<P: ?Sized>: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, position: &P) -> i32;
}

/// Material balance only.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    fn material_first_minus_second(board: &Board) -> i32 {
        let mut score = 0i32;
        for piece in ALL_PIECES {
            let value = piece_kind(piece).value();
            let white = (*board.pieces(piece) & *board.color_combined(Color::White)).popcnt();
            let black = (*board.pieces(piece) & *board.color_combined(Color::Black)).popcnt();
            score += (white as i32 - black as i32) * value;
        }
        score
    }
}

impl BoardScorer<ChessPosition> for MaterialScorer {
    fn score(&self, position: &ChessPosition) -> i32 {
        Self::material_first_minus_second(position.board()) * position.side_to_move().sign()
    }
}

/// Material plus a small piece-square bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScorer;

impl StandardScorer {
    fn positional_first_minus_second(board: &Board) -> i32 {
        let mut score = 0i32;
        for color in [Color::White, Color::Black] {
            let sign = side_of(color).sign();
            for piece in ALL_PIECES {
                let pieces = *board.pieces(piece) & *board.color_combined(color);
                for square in pieces {
                    score += sign * piece_square_bonus(piece, color, square.to_index());
                }
            }
        }
        score
    }
}

impl BoardScorer<ChessPosition> for StandardScorer {
    fn score(&self, position: &ChessPosition) -> i32 {
        let board = position.board();
        let first_minus_second = MaterialScorer::material_first_minus_second(board)
            + Self::positional_first_minus_second(board);
        first_minus_second * position.side_to_move().sign()
    }
}

fn piece_square_bonus(piece: Piece, color: Color, index: usize) -> i32 {
    let rank = (index / 8) as i32;
    let file = (index % 8) as i32;
    let r = match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    };
    let center_bonus = 4 - ((file - 3).abs() + (r - 3).abs());

    match piece_kind(piece) {
        PieceKind::Pawn => r * 8 - (file - 3).abs() * 2,
        PieceKind::Knight => center_bonus * 6,
        PieceKind::Bishop => center_bonus * 4 + r,
        PieceKind::Rook => r * 2,
        PieceKind::Queen => center_bonus * 2,
        PieceKind::King => {
            // Mild preference for a king tucked on its back ranks.
            if r <= 1 {
                8 - (file - 4).abs() * 2
            } else {
                -center_bonus * 4
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardScorer, MaterialScorer, StandardScorer};
    use crate::rules::chess_position::ChessPosition;

    #[test]
    fn material_scorer_reflects_side_to_move_perspective() {
        let white_to_move =
            ChessPosition::from_fen("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1").expect("FEN should parse");
        let black_to_move =
            ChessPosition::from_fen("4k3/8/8/8/8/8/8/4KQ2 b - - 0 1").expect("FEN should parse");

        let scorer = MaterialScorer;
        assert_eq!(scorer.score(&white_to_move), 900);
        assert_eq!(scorer.score(&black_to_move), -900);
    }

    #[test]
    fn standard_scorer_rewards_central_knight() {
        let center =
            ChessPosition::from_fen("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let rim =
            ChessPosition::from_fen("4k3/8/8/8/8/8/N7/4K3 w - - 0 1").expect("FEN should parse");
        let scorer = StandardScorer;
        assert!(
            scorer.score(&center) > scorer.score(&rim),
            "central knight should score better"
        );
    }

    #[test]
    fn standard_scorer_is_symmetric_under_colour_mirroring() {
        let position = ChessPosition::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .expect("FEN should parse");
        let mirrored = ChessPosition::from_fen(
            "rnbqk2r/pppp1ppp/5n2/2b1p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R b KQkq - 4 4",
        )
        .expect("FEN should parse");
        let scorer = StandardScorer;
        assert_eq!(scorer.score(&position), scorer.score(&mirrored));
        assert_eq!(scorer.score(&ChessPosition::startpos()), 0);
    }
}
