//! Principal variation search core.
//!
//! Negamax alpha-beta, fail-hard: every returned value lies in
//! `[alpha, beta]`. Per node, in order: terminal checks, transposition table
//! cutoff, horizon (quiescence), move expansion with a full window for the
//! first move and a null window plus re-search for the rest, then the table
//! write. The time governor is polled after each child returns.

use crate::rules::search_position::SearchPosition;
use crate::search::board_scoring::BoardScorer;
use crate::search::move_ordering::order_moves;
use crate::search::search_context::{SearchContext, MATE_SCORE, MAX_PLY};
use crate::search::time_governor::Clock;
use crate::search::transposition_table::{score_from_tt, score_to_tt, Bound, TTEntry};

/// Value of a node and the move that produced it, if any move raised alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeResult<M> {
    pub value: i32,
    pub best_move: Option<M>,
}

impl<M> NodeResult<M> {
    #[inline]
    pub const fn value(value: i32) -> Self {
        Self {
            value,
            best_move: None,
        }
    }
}

impl<'a, P, S, C> SearchContext<'a, P, S, C>
where
    P: SearchPosition,
    S: BoardScorer<P>,
    C: Clock,
{
    /// Search the live position to `depth` plies within `(alpha, beta)`.
    ///
    /// At ply 0 the draw check and table cutoffs are skipped so the root
    /// always yields a move when one exists. If the time governor stops the
    /// search, the value reflects only fully searched children and nothing
    /// is written to the table.
    pub fn alpha_beta(&mut self, mut alpha: i32, beta: i32, depth: u8) -> NodeResult<P::Move> {
        if alpha >= beta {
            return NodeResult::value(alpha);
        }
        self.stats.nodes += 1;
        let is_root = self.ply == 0;

        if !is_root && self.position.is_draw() {
            return NodeResult::value(0i32.clamp(alpha, beta));
        }
        if self.position.is_in_checkmate() {
            let mated = -MATE_SCORE + i32::from(self.ply);
            return NodeResult::value(mated.clamp(alpha, beta));
        }

        let key = self.position.position_hash();
        let entry = self.tt.probe(key);
        if let Some(entry) = entry {
            self.stats.tt_hits += 1;
            if !is_root {
                if let Some(value) = self.tt_cutoff(&entry, depth, alpha, beta) {
                    self.stats.tt_cutoffs += 1;
                    return NodeResult::value(value);
                }
            }
        }
        let tt_move = entry.and_then(|e| e.best_move);

        if depth == 0 || self.ply >= MAX_PLY {
            return NodeResult::value(self.quiesce(alpha, beta));
        }

        let mut moves = self.position.legal_moves(false);
        if moves.is_empty() {
            // Not mated, so stalemate.
            return NodeResult::value(0i32.clamp(alpha, beta));
        }
        order_moves(
            self.position,
            &mut moves,
            tt_move,
            self.config.penalize_attacked_targets,
        );

        let original_alpha = alpha;
        let mut best_move = None;
        let mut searched = 0usize;

        for mv in moves {
            self.push_move(mv);
            let value = if searched == 0 {
                -self.alpha_beta(-beta, -alpha, depth - 1).value
            } else {
                let probe = -self.alpha_beta(-alpha - 1, -alpha, depth - 1).value;
                if probe > alpha && probe < beta && !self.governor.stopped() {
                    self.stats.pvs_researches += 1;
                    -self.alpha_beta(-beta, -alpha, depth - 1).value
                } else {
                    probe
                }
            };
            self.pop_move(mv);

            // An interrupted child's value is meaningless; drop it.
            if self.governor.stopped() {
                break;
            }
            searched += 1;

            if value >= beta {
                self.record(key, depth, beta, Bound::Lower, Some(mv));
                return NodeResult {
                    value: beta,
                    best_move: Some(mv),
                };
            }
            if value > alpha {
                alpha = value;
                best_move = Some(mv);
            }

            if self.governor.poll_expired() {
                break;
            }
        }

        if !self.governor.stopped() {
            let bound = if alpha > original_alpha {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.record(key, depth, alpha, bound, best_move.or(tt_move));
        }

        NodeResult {
            value: alpha,
            best_move,
        }
    }

    /// Value licensed by a stored entry against the current window, if any.
    pub(crate) fn tt_cutoff(
        &self,
        entry: &TTEntry<P::Move>,
        depth: u8,
        alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        if entry.depth < depth {
            return None;
        }
        let value = score_from_tt(entry.value, self.ply);
        match entry.bound {
            Bound::Exact => Some(value.clamp(alpha, beta)),
            Bound::Lower if value >= beta => Some(beta),
            Bound::Upper if value <= alpha => Some(alpha),
            _ => None,
        }
    }

    pub(crate) fn record(
        &mut self,
        key: u64,
        depth: u8,
        value: i32,
        bound: Bound,
        best_move: Option<P::Move>,
    ) {
        self.tt.store(TTEntry {
            key,
            depth,
            value: score_to_tt(value, self.ply),
            bound,
            best_move,
        });
    }
}
