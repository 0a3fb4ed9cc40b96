//! Engine abstraction layer used by the UCI subsystem.
//!
//! Defines the `go` parameters and the output payload so the protocol loop
//! stays independent of how a move is picked.

use chess::ChessMove;

use crate::errors::EngineResult;
use crate::rules::chess_position::ChessPosition;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u16>,
}

impl GoParams {
    /// Whether the host supplied any time information at all.
    pub fn has_time_control(&self) -> bool {
        self.movetime_ms.is_some() || self.wtime_ms.is_some() || self.btime_ms.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// `None` only when the position has no legal moves.
    pub best_move: Option<ChessMove>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> EngineResult<()> {
        Ok(())
    }

    /// Search `position` and report a move. The position is used as scratch
    /// space during the search and is restored before returning.
    fn choose_move(
        &mut self,
        position: &mut ChessPosition,
        params: &GoParams,
    ) -> EngineResult<EngineOutput>;
}
