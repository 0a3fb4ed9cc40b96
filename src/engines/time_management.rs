//! Per-move budget allocation from UCI clock data.
//!
//! UCI passes raw clock data (`wtime/btime/winc/binc/movetime`); the engine
//! turns it into the single budget the time governor enforces.

use std::time::Duration;

use crate::engines::engine_trait::GoParams;
use crate::rules::search_position::Side;

/// Moves assumed to remain when the host sends no `movestogo`.
const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Budget for the side to move.
///
/// An explicit `movetime` wins. Otherwise the side's remaining clock is split
/// over the expected remaining moves, three quarters of the increment is
/// added, and the result is clamped to a quarter of the clock. With no clock
/// data at all, `fallback` is used.
pub fn resolve_move_budget(side: Side, params: &GoParams, fallback: Duration) -> Duration {
    if let Some(ms) = params.movetime_ms {
        return Duration::from_millis(ms);
    }

    let (remaining, increment) = match side {
        Side::First => (params.wtime_ms, params.winc_ms),
        Side::Second => (params.btime_ms, params.binc_ms),
    };
    let Some(remaining) = remaining else {
        return fallback;
    };

    let moves_left = params
        .movestogo
        .map(u64::from)
        .unwrap_or(DEFAULT_MOVES_TO_GO)
        .max(1);
    let base = remaining / moves_left;
    let inc_bonus = increment.unwrap_or(0).saturating_mul(3) / 4;
    let max_budget = (remaining / 4).max(1);
    Duration::from_millis(base.saturating_add(inc_bonus).clamp(1, max_budget))
}
