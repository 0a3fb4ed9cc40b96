//! Fixed-size transposition table keyed by position hash.
//!
//! Slots are selected by `hash % len` with no chaining. Every probe checks
//! the stored key against the probing hash, so an index collision reads as a
//! miss rather than as someone else's result. Replacement is depth-preferred:
//! a store only lands if its depth is at least the occupant's.

use crate::search::search_context::{MATE_BAND, MATE_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry<M> {
    pub key: u64,
    pub depth: u8,
    pub value: i32,
    pub bound: Bound,
    pub best_move: Option<M>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub rejected_stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable<M> {
    entries: Vec<Option<TTEntry<M>>>,
    enabled: bool,
    stats: TTStats,
}

impl<M: Copy> TranspositionTable<M> {
    pub fn with_entries(count: usize) -> Self {
        Self {
            entries: vec![None; count.max(1)],
            enabled: true,
            stats: TTStats::default(),
        }
    }

    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1).saturating_mul(1024 * 1024);
        let entry_size = std::mem::size_of::<Option<TTEntry<M>>>().max(1);
        Self::with_entries(bytes / entry_size)
    }

    /// A table that never hits and never stores.
    pub fn disabled() -> Self {
        Self {
            entries: vec![None],
            enabled: false,
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    /// Occupied slots per thousand.
    pub fn hashfull(&self) -> usize {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_some()).count();
        used * 1000 / sample.max(1)
    }

    #[inline]
    fn idx(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    pub fn probe(&mut self, key: u64) -> Option<TTEntry<M>> {
        if !self.enabled {
            return None;
        }
        self.stats.probes += 1;
        let hit = self.entries[self.idx(key)].filter(|e| e.key == key);
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    pub fn store(&mut self, entry: TTEntry<M>) {
        if !self.enabled {
            return;
        }
        let idx = self.idx(entry.key);
        let replace = match self.entries[idx] {
            None => true,
            Some(existing) => entry.depth >= existing.depth,
        };
        if replace {
            self.entries[idx] = Some(entry);
            self.stats.stores += 1;
        } else {
            self.stats.rejected_stores += 1;
        }
    }
}

/// Convert a root-relative mate score into a distance from the storing node.
#[inline]
pub fn score_to_tt(value: i32, ply: u16) -> i32 {
    let ply = i32::from(ply);
    if value >= MATE_BAND {
        value + ply
    } else if value <= -MATE_BAND {
        value - ply
    } else {
        value
    }
}

/// Inverse of [`score_to_tt`] for a node at `ply`.
#[inline]
pub fn score_from_tt(value: i32, ply: u16) -> i32 {
    let ply = i32::from(ply);
    if value >= MATE_BAND {
        (value - ply).min(MATE_SCORE)
    } else if value <= -MATE_BAND {
        (value + ply).max(-MATE_SCORE)
    } else {
        value
    }
}
