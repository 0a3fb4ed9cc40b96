//! Capture-only extension of the main search.
//!
//! At the horizon the static evaluation is only trusted once no captures are
//! pending. The side to move may "stand pat" on the static score or try any
//! capture; the search terminates because every ply removes material.

use crate::rules::search_position::SearchPosition;
use crate::search::board_scoring::BoardScorer;
use crate::search::move_ordering::order_moves;
use crate::search::search_context::SearchContext;
use crate::search::time_governor::Clock;
use crate::search::transposition_table::Bound;

impl<'a, P, S, C> SearchContext<'a, P, S, C>
where
    P: SearchPosition,
    S: BoardScorer<P>,
    C: Clock,
{
    /// Fail-hard quiescence value of the live position within `(alpha, beta)`.
    pub fn quiesce(&mut self, mut alpha: i32, beta: i32) -> i32 {
        if alpha >= beta {
            return alpha;
        }
        self.stats.qnodes += 1;

        let key = self.position.position_hash();
        let entry = self.tt.probe(key);
        if let Some(entry) = entry {
            self.stats.tt_hits += 1;
            if let Some(value) = self.tt_cutoff(&entry, 0, alpha, beta) {
                self.stats.tt_cutoffs += 1;
                return value;
            }
        }

        let stand_pat = self.scorer.score(self.position);
        if stand_pat >= beta {
            return beta;
        }
        let original_alpha = alpha;
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut captures = self.position.legal_moves(true);
        order_moves(
            self.position,
            &mut captures,
            entry.and_then(|e| e.best_move),
            self.config.penalize_attacked_targets,
        );

        let mut best_move = None;
        for mv in captures {
            self.push_move(mv);
            let value = -self.quiesce(-beta, -alpha);
            self.pop_move(mv);

            if value >= beta {
                self.record(key, 0, beta, Bound::Lower, Some(mv));
                return beta;
            }
            if value > alpha {
                alpha = value;
                best_move = Some(mv);
            }
        }

        let bound = if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.record(key, 0, alpha, bound, best_move);
        alpha
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::rules::chess_position::ChessPosition;
    use crate::search::board_scoring::{BoardScorer, MaterialScorer, StandardScorer};
    use crate::search::search_context::{SearchConfig, SearchContext, INFINITY};
    use crate::search::time_governor::{TimeGovernor, TurnClock};

    fn quiesce_fen(fen: &str, alpha: i32, beta: i32) -> (i32, i32) {
        let mut position = ChessPosition::from_fen(fen).expect("FEN should parse");
        let static_eval = MaterialScorer.score(&position);
        let config = SearchConfig::default();
        let governor = TimeGovernor::new(TurnClock::start(), Duration::from_secs(60));
        let mut ctx = SearchContext::new(&mut position, &MaterialScorer, governor, &config);
        (ctx.quiesce(alpha, beta), static_eval)
    }

    #[test]
    fn quiet_position_returns_stand_pat() {
        let mut position =
            ChessPosition::from_fen("4k3/8/8/8/8/8/3P4/R3K3 w - - 0 1").expect("FEN should parse");
        let static_eval = StandardScorer.score(&position);
        let config = SearchConfig::default();
        let governor = TimeGovernor::new(TurnClock::start(), Duration::from_secs(60));
        let mut ctx = SearchContext::new(&mut position, &StandardScorer, governor, &config);
        assert_eq!(ctx.quiesce(-INFINITY, INFINITY), static_eval);
        assert_eq!(ctx.stats().qnodes, 1);
    }

    #[test]
    fn winning_capture_is_found() {
        // White rook takes the undefended black queen.
        let (value, static_eval) = quiesce_fen("4k3/8/8/8/q7/8/8/R3K3 w - - 0 1", -INFINITY, INFINITY);
        assert_eq!(static_eval, -400);
        assert_eq!(value, 500);
    }

    #[test]
    fn defended_victim_is_not_taken_at_a_loss() {
        // Queen takes a pawn defended by a pawn: standing pat is better.
        let (value, static_eval) =
            quiesce_fen("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1", -INFINITY, INFINITY);
        assert_eq!(value, static_eval);
    }

    #[test]
    fn stand_pat_fails_high_at_beta() {
        let (value, _) = quiesce_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", -100, 200);
        assert_eq!(value, 200);
    }

    #[test]
    fn position_is_restored_after_quiescence() {
        let mut position = ChessPosition::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN should parse");
        let before = *position.board();
        let config = SearchConfig::default();
        let governor = TimeGovernor::new(TurnClock::start(), Duration::from_secs(60));
        {
            let mut ctx = SearchContext::new(&mut position, &MaterialScorer, governor, &config);
            let _ = ctx.quiesce(-INFINITY, INFINITY);
            assert!(ctx.stats().qnodes > 1);
        }
        assert_eq!(*position.board(), before);
        assert_eq!(position.moves_made(), 0);
    }
}
