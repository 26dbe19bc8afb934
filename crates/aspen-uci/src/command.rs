//! UCI command parsing.

use std::time::Duration;

use aspen_engine::position_key;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position};

use crate::error::UciError;

/// Largest accepted `Hash` value in megabytes.
pub const MAX_HASH_MB: usize = 65_536;
/// Largest accepted `Move Overhead` value in milliseconds.
pub const MAX_MOVE_OVERHEAD_MS: u64 = 5_000;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches until `stop`.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until the next time control. Parsed but not used for budgeting.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<u8>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search until `stop`.
    pub infinite: bool,
}

/// Position to search plus the keys of the positions that led to it.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    /// Current position.
    pub pos: Chess,
    /// Zobrist keys of earlier positions, oldest first, excluding `pos`.
    pub history: Vec<u64>,
}

/// Options settable through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
    /// Time reserved for transport latency on every move.
    MoveOverhead(Duration),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a position with optional moves applied.
    Position(PositionInfo),
    /// `go` -- start searching.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command, ignored.
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&first, rest)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match first {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(rest),
        "go" => parse_go(rest),
        "setoption" => parse_setoption(rest),
        _ => Ok(Command::Unknown(first.to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut pos, rest) = match tokens.first() {
        Some(&"startpos") => (Chess::default(), &tokens[1..]),
        Some(&"fen") => {
            let end = tokens
                .iter()
                .position(|&t| t == "moves")
                .unwrap_or(tokens.len());
            let fen = tokens[1..end].join(" ");
            (parse_fen(&fen)?, &tokens[end..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut history = Vec::new();
    if let Some((&"moves", moves)) = rest.split_first() {
        for &uci_str in moves {
            let mv = uci_str
                .parse::<UciMove>()
                .ok()
                .and_then(|uci| uci.to_move(&pos).ok())
                .ok_or_else(|| UciError::InvalidMove {
                    uci_move: uci_str.to_string(),
                })?;
            history.push(position_key(&pos));
            pos.play_unchecked(&mv);
        }
    }

    Ok(Command::Position(PositionInfo { pos, history }))
}

fn parse_fen(fen: &str) -> Result<Chess, UciError> {
    let invalid = || UciError::InvalidFen {
        fen: fen.to_string(),
    };
    let parsed: Fen = fen.parse().map_err(|_| invalid())?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|_| invalid())
}

/// Parse the `go` command arguments. Unknown tokens are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "wtime" => params.wtime = Some(parse_millis(value, "wtime")?),
            "btime" => params.btime = Some(parse_millis(value, "btime")?),
            "winc" => params.winc = Some(parse_millis(value, "winc")?),
            "binc" => params.binc = Some(parse_millis(value, "binc")?),
            "movestogo" => params.movestogo = Some(parse_int(value, "movestogo")?),
            "depth" => params.depth = Some(parse_int(value, "depth")?),
            "movetime" => params.movetime = Some(parse_millis(value, "movetime")?),
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse a millisecond value. Negative clocks, which some GUIs send after a
/// flag fall, clamp to zero.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let ms: i64 = parse_int(token, param)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

/// Parse `setoption name <name...> value <value>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let name_start = tokens.iter().position(|&t| t == "name").map(|i| i + 1);
    let value_pos = tokens.iter().position(|&t| t == "value");

    let name = match (name_start, value_pos) {
        (Some(start), Some(end)) if start <= end => tokens[start..end].join(" "),
        (Some(start), None) => tokens[start..].join(" "),
        _ => String::new(),
    };
    let value = value_pos
        .map(|i| tokens[i + 1..].join(" "))
        .unwrap_or_default();

    let invalid = || UciError::InvalidOption {
        name: name.clone(),
        value: value.clone(),
    };

    let option = match name.to_ascii_lowercase().as_str() {
        "hash" => {
            let mb: usize = value.parse().map_err(|_| invalid())?;
            if !(1..=MAX_HASH_MB).contains(&mb) {
                return Err(invalid());
            }
            UciOption::Hash(mb)
        }
        "move overhead" => {
            let ms: u64 = value.parse().map_err(|_| invalid())?;
            if ms > MAX_MOVE_OVERHEAD_MS {
                return Err(invalid());
            }
            UciOption::MoveOverhead(Duration::from_millis(ms))
        }
        _ => return Err(invalid()),
    };

    Ok(Command::SetOption(option))
}
