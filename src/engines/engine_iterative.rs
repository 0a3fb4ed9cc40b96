//! Iterative-deepening PVS engine.
//!
//! Wraps `choose_move` with UCI option handling, per-move budgeting and
//! `info` line formatting.

use std::time::Duration;

use chess::ChessMove;

use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::engines::time_management::resolve_move_budget;
use crate::errors::{EngineResult, SearchError};
use crate::rules::chess_position::ChessPosition;
use crate::rules::search_position::SearchPosition;
use crate::search::board_scoring::StandardScorer;
use crate::search::iterative_deepening::{choose_move, IterationReport};
use crate::search::search_context::{mate_in_moves, SearchConfig};
use crate::search::time_governor::TurnClock;

pub struct IterativeEngine {
    config: SearchConfig,
    fixed_depth: Option<u8>,
    scorer: StandardScorer,
}

impl Default for IterativeEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl IterativeEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            fixed_depth: None,
            scorer: StandardScorer,
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn fixed_depth(&self) -> Option<u8> {
        self.fixed_depth
    }
}

/// Largest accepted `Hash` value. The table is allocated afresh on every
/// `go`, so the bound also caps per-move setup cost.
pub const MAX_HASH_MB: usize = 1024;

fn invalid(name: &str, value: &str) -> SearchError {
    SearchError::InvalidOption {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_bool(name: &str, value: &str) -> EngineResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn format_score(score: i32) -> String {
    match mate_in_moves(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

fn format_info(report: &IterationReport<ChessMove>) -> String {
    let pv = report
        .pv
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "info depth {} score {} nodes {} qnodes {} hashfull {} time {} pv {}",
        report.depth,
        format_score(report.score),
        report.nodes,
        report.qnodes,
        report.hashfull,
        report.elapsed.as_millis(),
        pv
    )
}

impl Engine for IterativeEngine {
    fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        if name.eq_ignore_ascii_case("Hash") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(name, value))?;
            if !(1..=MAX_HASH_MB).contains(&parsed) {
                return Err(invalid(name, value));
            }
            self.config.tt_size_mb = parsed;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("FixedDepth") {
            let parsed = value
                .trim()
                .parse::<u8>()
                .map_err(|_| invalid(name, value))?;
            self.fixed_depth = if parsed == 0 { None } else { Some(parsed) };
            return Ok(());
        }
        if name.eq_ignore_ascii_case("AspirationWindow") {
            let parsed = value
                .trim()
                .parse::<i32>()
                .map_err(|_| invalid(name, value))?;
            if parsed < 1 {
                return Err(invalid(name, value));
            }
            self.config.aspiration_half_width = parsed;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("AttackPenalty") {
            self.config.penalize_attacked_targets = parse_bool(name, value)?;
            return Ok(());
        }
        log::debug!("ignoring unknown option '{name}'");
        Ok(())
    }

    fn choose_move(
        &mut self,
        position: &mut ChessPosition,
        params: &GoParams,
    ) -> EngineResult<EngineOutput> {
        let depth = params.depth.or(self.fixed_depth);
        let budget = if depth.is_some() && !params.has_time_control() {
            Duration::MAX
        } else {
            resolve_move_budget(
                position.side_to_move(),
                params,
                self.config.default_move_budget,
            )
        };
        let mut config = self.config.clone();
        if let Some(depth) = depth {
            config.max_depth = depth.max(1);
        }

        let result = match choose_move(position, &self.scorer, TurnClock::start(), budget, &config)
        {
            Ok(result) => result,
            Err(SearchError::NoLegalMoves) => {
                return Ok(EngineOutput {
                    best_move: None,
                    info_lines: vec!["info string no legal moves".to_owned()],
                });
            }
            Err(err) => return Err(err),
        };

        let mut out = EngineOutput {
            best_move: Some(result.best_move),
            info_lines: result.iterations.iter().map(format_info).collect(),
        };
        if result.iterations.is_empty() {
            out.info_lines.push(format!(
                "info string no completed iteration, playing {}",
                result.best_move
            ));
        }
        out.info_lines.push(format!(
            "info string tt probes {} hits {} stores {} cutoffs {} researches {} aspiration_retries {}",
            result.tt_stats.probes,
            result.tt_stats.hits,
            result.tt_stats.stores,
            result.stats.tt_cutoffs,
            result.stats.pvs_researches,
            result.stats.aspiration_retries
        ));
        Ok(out)
    }
}
