//! Per-move search state.
//!
//! One `SearchContext` is built for each `choose_move` call and dropped when
//! it returns. It owns the transposition table, the time governor, the node
//! counters and the current ply, and borrows the live position and the
//! evaluator. Nothing survives between calls.

use std::time::Duration;

use crate::rules::search_position::SearchPosition;
use crate::search::board_scoring::BoardScorer;
use crate::search::time_governor::{Clock, TimeGovernor};
use crate::search::transposition_table::TranspositionTable;

/// Larger than any reachable score; the open aspiration window.
pub const INFINITY: i32 = 32_000;
pub const MATE_SCORE: i32 = 30_000;
pub const MAX_PLY: u16 = 256;
/// Scores at or beyond this magnitude encode a forced mate.
pub const MATE_BAND: i32 = MATE_SCORE - MAX_PLY as i32;

#[inline]
pub fn is_mate_score(value: i32) -> bool {
    value.abs() >= MATE_BAND
}

/// Full moves to mate, positive when the side to move delivers it.
pub fn mate_in_moves(value: i32) -> Option<i32> {
    if !is_mate_score(value) {
        return None;
    }
    let plies = MATE_SCORE - value.abs();
    let moves = (plies + 1) / 2;
    Some(if value > 0 { moves } else { -moves })
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub tt_size_mb: usize,
    pub aspiration_half_width: i32,
    pub use_tt: bool,
    pub penalize_attacked_targets: bool,
    pub default_move_budget: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            tt_size_mb: 16,
            aspiration_half_width: 25,
            use_tt: true,
            penalize_attacked_targets: true,
            default_move_budget: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
    pub pvs_researches: u64,
    pub aspiration_retries: u64,
}

pub struct SearchContext<'a, P: SearchPosition, S, C> {
    pub(crate) position: &'a mut P,
    pub(crate) scorer: &'a S,
    pub(crate) tt: TranspositionTable<P::Move>,
    pub(crate) governor: TimeGovernor<C>,
    pub(crate) config: &'a SearchConfig,
    pub(crate) ply: u16,
    pub(crate) stats: SearchStats,
}

impl<'a, P, S, C> SearchContext<'a, P, S, C>
where
    P: SearchPosition,
    S: BoardScorer<P>,
    C: Clock,
{
    pub fn new(
        position: &'a mut P,
        scorer: &'a S,
        governor: TimeGovernor<C>,
        config: &'a SearchConfig,
    ) -> Self {
        let tt = if config.use_tt {
            TranspositionTable::new_with_mb(config.tt_size_mb)
        } else {
            TranspositionTable::disabled()
        };
        Self::with_table(position, scorer, governor, config, tt)
    }

    pub fn with_table(
        position: &'a mut P,
        scorer: &'a S,
        governor: TimeGovernor<C>,
        config: &'a SearchConfig,
        tt: TranspositionTable<P::Move>,
    ) -> Self {
        Self {
            position,
            scorer,
            tt,
            governor,
            config,
            ply: 0,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    #[inline]
    pub fn table(&self) -> &TranspositionTable<P::Move> {
        &self.tt
    }

    #[inline]
    pub fn governor(&self) -> &TimeGovernor<C> {
        &self.governor
    }

    /// Make a move and step one ply down.
    #[inline]
    pub(crate) fn push_move(&mut self, mv: P::Move) {
        self.position.make_move(mv);
        self.ply += 1;
    }

    #[inline]
    pub(crate) fn pop_move(&mut self, mv: P::Move) {
        self.ply -= 1;
        self.position.unmake_move(mv);
    }
}
