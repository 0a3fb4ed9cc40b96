//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, maintains the current position, routes `go` requests
//! to the engine and emits protocol-compliant output on stdout. Diagnostics
//! go through `log` so they never mix with protocol lines.

use std::io::{self, BufRead, Write};

use crate::engines::engine_iterative::IterativeEngine;
use crate::engines::engine_trait::{Engine, GoParams};
use crate::errors::{EngineResult, SearchError};
use crate::rules::chess_position::ChessPosition;

const UCI_ENGINE_NAME: &str = "Plum Search";
const UCI_ENGINE_AUTHOR: &str = "jwkunz";

pub fn run_stdio_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

struct UciState {
    position: ChessPosition,
    engine: Box<dyn Engine>,
}

impl UciState {
    fn new() -> Self {
        Self {
            position: ChessPosition::startpos(),
            engine: Box::new(IterativeEngine::default()),
        }
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        log::trace!("<< {trimmed}");

        let cmd = trimmed.split_whitespace().next().unwrap_or_default();
        match cmd {
            "uci" => {
                writeln!(out, "id name {}", UCI_ENGINE_NAME)?;
                writeln!(out, "id author {}", UCI_ENGINE_AUTHOR)?;
                writeln!(out, "option name Hash type spin default 16 min 1 max 1024")?;
                writeln!(
                    out,
                    "option name FixedDepth type spin default 0 min 0 max 64"
                )?;
                writeln!(
                    out,
                    "option name AspirationWindow type spin default 25 min 1 max 1000"
                )?;
                writeln!(out, "option name AttackPenalty type check default true")?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    writeln!(out, "info string setoption error: {}", err)?;
                }
            }
            "ucinewgame" => {
                self.position = ChessPosition::startpos();
                self.engine.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    writeln!(out, "info string position error: {}", err)?;
                }
            }
            "go" => {
                if let Err(err) = self.handle_go(trimmed, out) {
                    writeln!(out, "info string go error: {}", err)?;
                    writeln!(out, "bestmove 0000")?;
                }
            }
            "stop" => {
                // Search is synchronous; nothing is running when this arrives.
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                log::debug!("ignoring unknown command '{cmd}'");
            }
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> EngineResult<()> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        if name_tokens.is_empty() {
            return Err(SearchError::MalformedCommand(line.to_owned()));
        }
        self.engine
            .set_option(&name_tokens.join(" "), &value_tokens.join(" "))
    }

    /// Replace the current position. On any error the previous position is
    /// kept untouched.
    fn handle_position(&mut self, line: &str) -> EngineResult<()> {
        let mut tokens = line.split_whitespace().peekable();
        let _ = tokens.next(); // "position"

        let mut base = match tokens.next() {
            Some("startpos") => ChessPosition::startpos(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(&next) = tokens.peek() {
                    if next == "moves" {
                        break;
                    }
                    fen_parts.push(next);
                    tokens.next();
                }
                if fen_parts.is_empty() {
                    return Err(SearchError::MalformedCommand(line.to_owned()));
                }
                ChessPosition::from_fen(&fen_parts.join(" "))?
            }
            _ => return Err(SearchError::MalformedCommand(line.to_owned())),
        };

        if tokens.peek().copied() == Some("moves") {
            let _ = tokens.next();
            for lan in tokens {
                base.apply_uci_move(lan)?;
            }
        }

        self.position = base;
        Ok(())
    }

    fn handle_go(&mut self, line: &str, out: &mut impl Write) -> EngineResult<()> {
        let params = parse_go_params(line);
        let result = self.engine.choose_move(&mut self.position, &params)?;

        let mut emit = |text: String| {
            if let Err(err) = writeln!(out, "{text}") {
                log::warn!("failed to write protocol output: {err}");
            }
        };
        for info in result.info_lines {
            emit(info);
        }
        match result.best_move {
            Some(best) => emit(format!("bestmove {best}")),
            None => emit("bestmove 0000".to_owned()),
        }
        Ok(())
    }
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => params.depth = tokens.next().and_then(|x| x.parse::<u8>().ok()),
            "movetime" => params.movetime_ms = tokens.next().and_then(|x| x.parse::<u64>().ok()),
            "wtime" => params.wtime_ms = tokens.next().and_then(|x| x.parse::<u64>().ok()),
            "btime" => params.btime_ms = tokens.next().and_then(|x| x.parse::<u64>().ok()),
            "winc" => params.winc_ms = tokens.next().and_then(|x| x.parse::<u64>().ok()),
            "binc" => params.binc_ms = tokens.next().and_then(|x| x.parse::<u64>().ok()),
            "movestogo" => params.movestogo = tokens.next().and_then(|x| x.parse::<u16>().ok()),
            _ => {}
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::{parse_go_params, UciState};
    use crate::rules::search_position::{SearchPosition, Side};

    fn run(state: &mut UciState, line: &str) -> String {
        let mut out = Vec::new();
        state
            .handle_command(line, &mut out)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("protocol output is UTF-8")
    }

    #[test]
    fn uci_handshake_lists_options() {
        let mut state = UciState::new();
        let out = run(&mut state, "uci");
        assert!(out.starts_with("id name Plum Search"));
        assert!(out.contains("option name AspirationWindow"));
        assert!(out.trim_end().ends_with("uciok"));
        assert_eq!(run(&mut state, "isready"), "readyok\n");
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position startpos moves e2e4 e7e5 g1f3")
            .expect("position command should parse");

        assert_eq!(state.position.side_to_move(), Side::Second);
        assert_eq!(state.position.moves_made(), 3);
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 7 40")
            .expect("position fen should parse");

        assert_eq!(state.position.halfmove_clock(), 7);
        assert_eq!(state.position.legal_moves(false).len(), 6);
    }

    #[test]
    fn illegal_move_keeps_previous_position() {
        let mut state = UciState::new();
        let out = run(&mut state, "position startpos moves e2e4 e2e4");
        assert!(out.starts_with("info string position error: illegal move 'e2e4'"));
        assert_eq!(state.position.moves_made(), 0);
    }

    #[test]
    fn setoption_forwards_to_engine_and_reports_errors() {
        let mut state = UciState::new();
        assert_eq!(run(&mut state, "setoption name Hash value 32"), "");
        let out = run(&mut state, "setoption name AspirationWindow value wide");
        assert!(out.contains("setoption error"));
        let out = run(&mut state, "setoption value 3");
        assert!(out.contains("malformed command"));
    }

    #[test]
    fn parse_go_params_keeps_clock_fields_without_forcing_movetime() {
        let params = parse_go_params("go wtime 120000 btime 60000 winc 1000 binc 1000 movestogo 24");
        assert_eq!(params.movetime_ms, None);
        assert_eq!(params.wtime_ms, Some(120_000));
        assert_eq!(params.btime_ms, Some(60_000));
        assert_eq!(params.winc_ms, Some(1_000));
        assert_eq!(params.binc_ms, Some(1_000));
        assert_eq!(params.movestogo, Some(24));
        assert_eq!(params.depth, None);
    }

    #[test]
    fn go_depth_emits_info_and_bestmove() {
        let mut state = UciState::new();
        run(&mut state, "position startpos moves e2e4");
        let out = run(&mut state, "go depth 2");
        assert!(out.contains("info depth 2 "));
        let best = out
            .lines()
            .find_map(|l| l.strip_prefix("bestmove "))
            .expect("bestmove line");
        assert!(state.position.parse_uci_move(best).is_ok(), "bestmove {best} is legal");
        assert_eq!(state.position.moves_made(), 1);
    }

    #[test]
    fn go_on_finished_game_reports_null_move() {
        let mut state = UciState::new();
        run(&mut state, "position fen 6k1/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        let out = run(&mut state, "go movetime 50");
        assert!(out.trim_end().ends_with("bestmove 0000"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut state = UciState::new();
        let mut out = Vec::new();
        assert!(state
            .handle_command("quit", &mut out)
            .expect("writing to a Vec cannot fail"));
    }
}
