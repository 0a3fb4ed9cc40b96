//! Heuristic move ordering.
//!
//! Moves are sorted in place by descending priority so alpha-beta sees the
//! likely-best move first:
//! 1. the transposition table's stored best move,
//! 2. captures by MVV-LVA (`10 * victim - attacker`),
//! 3. promotions, by the value of the promoted-to piece,
//! 4. optionally, minus the mover's value when its target square is attacked.
//!
//! The sort is stable, so equal scores keep the generator's order and search
//! stays reproducible.

use crate::rules::search_position::{MoveTraits, SearchPosition};

const TT_MOVE_PRIORITY: i32 = 1_000_000;

/// Priority of a single move, ignoring the TT bucket.
#[inline]
pub fn heuristic_score(traits: MoveTraits, target_attacked: bool) -> i32 {
    let mut score = 0i32;
    if let Some(victim) = traits.captured {
        score += 10 * victim.value() - traits.moved.value();
    }
    if let Some(promoted) = traits.promotion {
        score += promoted.value();
    }
    if target_attacked {
        score -= traits.moved.value();
    }
    score
}

pub fn move_priority<P: SearchPosition>(
    position: &P,
    mv: P::Move,
    tt_move: Option<P::Move>,
    penalize_attacked_targets: bool,
) -> i32 {
    if tt_move == Some(mv) {
        return TT_MOVE_PRIORITY;
    }
    let attacked = penalize_attacked_targets && position.is_target_attacked(mv);
    heuristic_score(position.move_traits(mv), attacked)
}

/// Reorder `moves` by descending priority. Does not touch the position.
pub fn order_moves<P: SearchPosition>(
    position: &P,
    moves: &mut [P::Move],
    tt_move: Option<P::Move>,
    penalize_attacked_targets: bool,
) {
    moves.sort_by_cached_key(|&mv| {
        std::cmp::Reverse(move_priority(
            position,
            mv,
            tt_move,
            penalize_attacked_targets,
        ))
    });
}
