//! Iterative deepening driver with aspiration windows.
//!
//! Depth 1 runs with the open window. Each later depth starts from a window
//! of `aspiration_half_width` around the previous accepted score and doubles
//! the half-width after every fail-low or fail-high until the value lands
//! strictly inside, or the window has grown to `(-INFINITY, INFINITY)`.
//! The table, governor and counters live for the whole call, so later
//! iterations reuse earlier best moves for ordering.

use std::time::Duration;

use crate::errors::{EngineResult, SearchError};
use crate::rules::search_position::SearchPosition;
use crate::search::board_scoring::BoardScorer;
use crate::search::move_ordering::order_moves;
use crate::search::search_context::{
    is_mate_score, SearchConfig, SearchContext, SearchStats, INFINITY, MATE_SCORE,
};
use crate::search::time_governor::{Clock, TimeGovernor};
use crate::search::transposition_table::TTStats;

/// One accepted iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport<M> {
    pub depth: u8,
    pub score: i32,
    pub nodes: u64,
    pub qnodes: u64,
    /// Table occupancy per thousand slots.
    pub hashfull: usize,
    pub elapsed: Duration,
    pub pv: Vec<M>,
}

#[derive(Debug, Clone)]
pub struct SearchResult<M> {
    pub best_move: M,
    /// Score of the last accepted iteration, side-to-move perspective.
    pub score: i32,
    /// Deepest fully accepted iteration; 0 when no iteration finished.
    pub reached_depth: u8,
    pub stats: SearchStats,
    pub tt_stats: TTStats,
    pub pv: Vec<M>,
    pub iterations: Vec<IterationReport<M>>,
    pub elapsed: Duration,
}

/// Pick a move for the side to move within `budget`.
///
/// Always returns one of the current legal moves when any exist. The
/// position is borrowed mutably for the duration of the search and is left
/// exactly as it was passed in.
pub fn choose_move<P, S, C>(
    position: &mut P,
    scorer: &S,
    clock: C,
    budget: Duration,
    config: &SearchConfig,
) -> EngineResult<SearchResult<P::Move>>
where
    P: SearchPosition,
    S: BoardScorer<P>,
    C: Clock,
{
    let mut root_moves = position.legal_moves(false);
    if root_moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    order_moves(
        &*position,
        &mut root_moves,
        None,
        config.penalize_attacked_targets,
    );
    let fallback = root_moves[0];

    if root_moves.len() == 1 {
        let score = scorer.score(position);
        log::info!("only move {fallback} value {score}");
        return Ok(SearchResult {
            best_move: fallback,
            score,
            reached_depth: 0,
            stats: SearchStats::default(),
            tt_stats: TTStats::default(),
            pv: vec![fallback],
            iterations: Vec::new(),
            elapsed: clock.elapsed_this_turn(),
        });
    }

    let governor = TimeGovernor::new(clock, budget);
    let mut ctx = SearchContext::new(position, scorer, governor, config);
    let mut best_move = fallback;
    let mut score = 0;
    let mut reached_depth = 0u8;
    let mut pv = vec![fallback];
    let mut iterations = Vec::new();

    for depth in 1..=config.max_depth.max(1) {
        if depth > 1 && ctx.governor.poll_expired() {
            break;
        }
        match ctx.aspiration_search(depth, (depth > 1).then_some(score)) {
            Iteration::Accepted { value, best } => {
                score = value;
                best_move = best.unwrap_or(best_move);
                reached_depth = depth;
                pv = ctx.principal_variation(depth);
                if pv.first() != Some(&best_move) {
                    pv = vec![best_move];
                }
                let stats = ctx.stats();
                let elapsed = ctx.governor.elapsed();
                log::debug!(
                    "depth {depth} score {score} nodes {} qnodes {} elapsed {:?} best {best_move}",
                    stats.nodes,
                    stats.qnodes,
                    elapsed
                );
                iterations.push(IterationReport {
                    depth,
                    score,
                    nodes: stats.nodes,
                    qnodes: stats.qnodes,
                    hashfull: ctx.table().hashfull(),
                    elapsed,
                    pv: pv.clone(),
                });
                if is_mate_score(score) && MATE_SCORE - score.abs() <= i32::from(depth) {
                    break;
                }
            }
            Iteration::Interrupted { best } => {
                if let Some(best) = best {
                    if best != best_move {
                        log::debug!("depth {depth} interrupted, switching to {best}");
                        best_move = best;
                        pv = vec![best];
                    }
                }
                break;
            }
        }
    }

    let stats = ctx.stats();
    let tt_stats = ctx.table().stats();
    let elapsed = ctx.governor.elapsed();
    log::info!(
        "bestmove {best_move} value {score} depth {reached_depth} nodes {} qnodes {} elapsed {:?}",
        stats.nodes,
        stats.qnodes,
        elapsed
    );

    Ok(SearchResult {
        best_move,
        score,
        reached_depth,
        stats,
        tt_stats,
        pv,
        iterations,
        elapsed,
    })
}

enum Iteration<M> {
    Accepted { value: i32, best: Option<M> },
    /// Stopped by the governor. `best` is set only when a fully searched
    /// root move raised alpha.
    Interrupted { best: Option<M> },
}

impl<'a, P, S, C> SearchContext<'a, P, S, C>
where
    P: SearchPosition,
    S: BoardScorer<P>,
    C: Clock,
{
    fn aspiration_search(&mut self, depth: u8, previous: Option<i32>) -> Iteration<P::Move> {
        let mut half_width = self.config.aspiration_half_width.max(1);
        let (mut alpha, mut beta) = match previous {
            Some(center) => (
                (center - half_width).max(-INFINITY),
                (center + half_width).min(INFINITY),
            ),
            None => (-INFINITY, INFINITY),
        };

        loop {
            let result = self.alpha_beta(alpha, beta, depth);
            if self.governor.stopped() {
                return Iteration::Interrupted {
                    best: result.best_move,
                };
            }

            let failed_low = result.value <= alpha && alpha > -INFINITY;
            let failed_high = result.value >= beta && beta < INFINITY;
            if !failed_low && !failed_high {
                return Iteration::Accepted {
                    value: result.value,
                    best: result.best_move,
                };
            }

            self.stats.aspiration_retries += 1;
            half_width = half_width.saturating_mul(2).min(2 * INFINITY);
            let center = previous.unwrap_or(0);
            alpha = (center - half_width).max(-INFINITY);
            beta = (center + half_width).min(INFINITY);
            log::trace!(
                "depth {depth} {} at {}, retry ({alpha}, {beta})",
                if failed_low { "fail-low" } else { "fail-high" },
                result.value
            );
        }
    }

    /// Best-move chain from the root read back out of the table.
    ///
    /// Each stored move is checked against the legal moves before it is
    /// played; the walk stops at a missing entry, an illegal move, a
    /// repeated position or after `max_len` plies.
    pub fn principal_variation(&mut self, max_len: u8) -> Vec<P::Move> {
        let mut line = Vec::new();
        let mut seen = Vec::new();
        for _ in 0..max_len {
            let key = self.position.position_hash();
            if seen.contains(&key) {
                break;
            }
            seen.push(key);
            let Some(mv) = self.tt.probe(key).and_then(|e| e.best_move) else {
                break;
            };
            if !self.position.legal_moves(false).contains(&mv) {
                break;
            }
            self.position.make_move(mv);
            line.push(mv);
        }
        for &mv in line.iter().rev() {
            self.position.unmake_move(mv);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::choose_move;
    use crate::errors::SearchError;
    use crate::rules::chess_position::ChessPosition;
    use crate::rules::search_position::SearchPosition;
    use crate::search::board_scoring::StandardScorer;
    use crate::search::search_context::{SearchConfig, MATE_SCORE};
    use crate::search::test_tree::{reference_negamax, TreePosition, TreeScorer};
    use crate::search::time_governor::{StepClock, TurnClock};

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn one_centipawn_window_matches_full_window_value() {
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tree = TreePosition::random(&mut rng, 5, 4);
            let config = SearchConfig {
                max_depth: 5,
                aspiration_half_width: 1,
                tt_size_mb: 1,
                ..SearchConfig::default()
            };
            let result = choose_move(
                &mut tree,
                &TreeScorer,
                TurnClock::start(),
                Duration::from_secs(600),
                &config,
            )
            .expect("tree root has moves");
            if result.iterations.is_empty() {
                // Single root move, returned without searching.
                continue;
            }
            assert_eq!(result.reached_depth, 5, "seed {seed}");
            assert_eq!(result.score, reference_negamax(&tree, 5), "seed {seed}");
            for report in &result.iterations {
                assert_eq!(report.score, reference_negamax(&tree, report.depth));
            }
            assert!(tree.at_root());
        }
    }

    #[test]
    fn narrow_windows_trigger_retries() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = TreePosition::random(&mut rng, 6, 3);
        let config = SearchConfig {
            max_depth: 6,
            aspiration_half_width: 1,
            ..SearchConfig::default()
        };
        let result = choose_move(
            &mut tree,
            &TreeScorer,
            TurnClock::start(),
            Duration::from_secs(600),
            &config,
        )
        .expect("tree root has moves");
        let scores: Vec<i32> = result.iterations.iter().map(|r| r.score).collect();
        let moved = scores.windows(2).filter(|w| (w[0] - w[1]).abs() >= 1).count() as u64;
        assert!(result.stats.aspiration_retries >= moved);
    }

    #[test]
    fn no_legal_moves_is_an_error() {
        let mut position =
            ChessPosition::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        let err = choose_move(
            &mut position,
            &StandardScorer,
            TurnClock::start(),
            Duration::from_millis(50),
            &SearchConfig::default(),
        )
        .expect_err("stalemate has no moves");
        assert_eq!(err, SearchError::NoLegalMoves);
    }

    #[test]
    fn single_legal_move_is_returned_without_searching() {
        let mut position =
            ChessPosition::from_fen("7k/8/5K2/8/8/8/8/6R1 b - - 0 1").expect("FEN should parse");
        let result = choose_move(
            &mut position,
            &StandardScorer,
            StepClock::new(Duration::from_secs(1)),
            Duration::ZERO,
            &SearchConfig::default(),
        )
        .expect("one legal move");
        assert_eq!(result.best_move.to_string(), "h8h7");
        assert_eq!(result.stats.nodes, 0);
    }

    #[test]
    fn mate_in_one_is_found_and_deepening_stops() {
        let mut position =
            ChessPosition::from_fen("6k1/8/6K1/8/8/8/8/Q7 w - - 0 1").expect("FEN should parse");
        let result = choose_move(
            &mut position,
            &StandardScorer,
            TurnClock::start(),
            Duration::from_secs(30),
            &SearchConfig::default(),
        )
        .expect("white has moves");
        assert_eq!(result.score, MATE_SCORE - 1);
        assert_eq!(result.reached_depth, 1);
        position.make_move(result.best_move);
        assert!(position.is_in_checkmate());
    }

    #[test]
    fn zero_budget_still_returns_a_legal_move() {
        let mut position = ChessPosition::from_fen(KIWIPETE).expect("FEN should parse");
        let legal = position.legal_moves(false);
        let result = choose_move(
            &mut position,
            &StandardScorer,
            TurnClock::start(),
            Duration::ZERO,
            &SearchConfig::default(),
        )
        .expect("kiwipete has moves");
        assert!(legal.contains(&result.best_move));
    }

    #[test]
    fn step_clock_abort_leaves_position_unchanged() {
        for budget_steps in [1u64, 7, 40, 300] {
            let mut position = ChessPosition::from_fen(KIWIPETE).expect("FEN should parse");
            let before = *position.board();
            let legal = position.legal_moves(false);
            let result = choose_move(
                &mut position,
                &StandardScorer,
                StepClock::new(Duration::from_millis(1)),
                Duration::from_millis(budget_steps),
                &SearchConfig::default(),
            )
            .expect("kiwipete has moves");
            assert!(legal.contains(&result.best_move), "budget {budget_steps}");
            assert_eq!(*position.board(), before);
            assert_eq!(position.moves_made(), 0);
        }
    }

    #[test]
    fn search_returns_close_to_the_budget() {
        let mut position = ChessPosition::startpos();
        let budget = Duration::from_millis(100);
        let started = std::time::Instant::now();
        let result = choose_move(
            &mut position,
            &StandardScorer,
            TurnClock::start(),
            budget,
            &SearchConfig::default(),
        )
        .expect("start position has moves");
        assert!(started.elapsed() < budget + Duration::from_secs(2));
        assert!(result.reached_depth >= 1);
        assert!(position.legal_moves(false).contains(&result.best_move));
    }

    #[test]
    fn principal_variation_starts_with_the_best_move() {
        let mut position = ChessPosition::startpos();
        let config = SearchConfig {
            max_depth: 4,
            ..SearchConfig::default()
        };
        let result = choose_move(
            &mut position,
            &StandardScorer,
            TurnClock::start(),
            Duration::from_secs(600),
            &config,
        )
        .expect("start position has moves");
        assert_eq!(result.reached_depth, 4);
        assert_eq!(result.pv.first(), Some(&result.best_move));
        assert!(result.pv.len() <= 4);

        let mut replay = ChessPosition::startpos();
        for mv in &result.pv {
            assert!(replay.legal_moves(false).contains(mv));
            replay.make_move(*mv);
        }
    }
}
