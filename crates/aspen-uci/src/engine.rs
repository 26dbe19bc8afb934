//! Event-driven UCI engine: commands are read on one thread while the
//! search runs on another.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use aspen_engine::{
    DEFAULT_MOVE_OVERHEAD, IterationInfo, ReportedScore, SearchConfig, SearchError,
    SearchLimits, SearchResult, Searcher, limits_from_go,
};
use shakmaty::{CastlingMode, Chess, Position};
use tracing::{debug, info, warn};

use crate::command::{
    Command, GoParams, MAX_HASH_MB, MAX_MOVE_OVERHEAD_MS, PositionInfo, UciOption, parse_command,
};
use crate::error::UciError;

/// Options adjustable through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Time reserved for transport latency on every move.
    pub move_overhead: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: SearchConfig::default().hash_mb,
            move_overhead: DEFAULT_MOVE_OVERHEAD,
        }
    }
}

enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
    InputFailed(UciError),
}

/// Sent back by the search thread along with the searcher it borrowed.
struct SearchDone {
    result: Result<SearchResult, SearchError>,
    searcher: Searcher,
}

/// The UCI engine: current position, game history and the searcher.
///
/// While a search runs the worker thread owns the searcher. Table changes
/// requested in the meantime are applied when it comes back.
pub struct UciEngine {
    pos: Chess,
    history: Vec<u64>,
    searcher: Option<Searcher>,
    stop_flag: Arc<AtomicBool>,
    config: EngineConfig,
    pending_new_game: bool,
    pending_resize_tt: Option<usize>,
}

impl UciEngine {
    /// Engine at the starting position with default options.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine at the starting position with the given options.
    pub fn with_config(config: EngineConfig) -> Self {
        let search_config = SearchConfig {
            hash_mb: config.hash_mb,
            ..SearchConfig::default()
        };
        Self {
            pos: Chess::default(),
            history: Vec::new(),
            searcher: Some(Searcher::new(search_config)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            config,
            pending_new_game: false,
            pending_resize_tt: None,
        }
    }

    /// Current options.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn is_searching(&self) -> bool {
        self.searcher.is_none()
    }

    /// Run the UCI loop until `quit` or end of input.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        let _ = stdin_tx.send(EngineEvent::InputFailed(e.into()));
                        return;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(cmd = %trimmed, "received UCI command");
                if stdin_tx
                    .send(EngineEvent::UciCommand(parse_command(trimmed)))
                    .is_err()
                {
                    return;
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        let mut failure = None;
        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption(opt) => self.handle_setoption(opt),
                    Command::Stop => self.handle_stop(),
                    Command::Quit => break,
                    Command::Unknown(cmd) => {
                        if !cmd.is_empty() {
                            debug!(%cmd, "ignoring unknown command");
                        }
                    }
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
                EngineEvent::InputFailed(e) => {
                    warn!(error = %e, "failed to read stdin");
                    failure = Some(e);
                    break;
                }
            }
        }

        // Let a running search report its move before exiting.
        if self.is_searching() {
            self.handle_stop();
            for event in &rx {
                if let EngineEvent::SearchDone(done) = event {
                    self.finish_search(done);
                    break;
                }
            }
        }

        info!("aspen shutting down");
        failure.map_or(Ok(()), Err)
    }

    fn handle_uci(&self) {
        println!("id name aspen {}", env!("CARGO_PKG_VERSION"));
        println!("id author the aspen developers");
        println!(
            "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
            EngineConfig::default().hash_mb
        );
        println!(
            "option name Move Overhead type spin default {} min 0 max {MAX_MOVE_OVERHEAD_MS}",
            DEFAULT_MOVE_OVERHEAD.as_millis()
        );
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.pos = Chess::default();
        self.history.clear();
        match self.searcher.as_mut() {
            Some(searcher) => searcher.new_game(),
            None => self.pending_new_game = true,
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.pos = info.pos;
        self.history = info.history;
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::Hash(mb) => {
                self.config.hash_mb = mb;
                match self.searcher.as_mut() {
                    Some(searcher) => searcher.resize_tt(mb),
                    None => self.pending_resize_tt = Some(mb),
                }
            }
            UciOption::MoveOverhead(overhead) => self.config.move_overhead = overhead,
        }
        debug!(config = ?self.config, "option updated");
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        let Some(mut searcher) = self.searcher.take() else {
            warn!("go received while searching, ignoring");
            return;
        };

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            params.wtime,
            params.btime,
            params.winc,
            params.binc,
            params.movetime,
            params.infinite,
            self.pos.turn(),
            self.config.move_overhead,
            Arc::clone(&self.stop_flag),
        );
        debug!(
            soft = ?control.soft_limit(),
            hard = ?control.hard_limit(),
            depth = ?params.depth,
            "starting search"
        );

        let limits = SearchLimits {
            depth: params.depth,
        };
        let pos = self.pos.clone();
        let history = self.history.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            let result = searcher.think(&pos, limits, &control, &history, |info| {
                println!("{}", info_line(info));
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        });
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;

        // A fresh table is already empty, so a resize covers a pending clear.
        if let Some(mb) = self.pending_resize_tt.take() {
            searcher.resize_tt(mb);
        }
        if std::mem::take(&mut self.pending_new_game) {
            searcher.new_game();
        }
        self.searcher = Some(searcher);

        println!("{}", bestmove_line(&done.result));
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `info` line for a completed iteration.
pub fn info_line(info: &IterationInfo) -> String {
    let elapsed_ms = info.elapsed.as_millis();
    let nps = u128::from(info.nodes) * 1000 / elapsed_ms.max(1);
    format!(
        "info depth {} score {} time {} nodes {} nps {} hashfull {} pv {}",
        info.depth,
        ReportedScore::from_score(info.score),
        elapsed_ms,
        info.nodes,
        nps,
        info.hashfull,
        info.best_move.to_uci(CastlingMode::Standard),
    )
}

/// `bestmove` line for a finished search; `0000` when there was no move.
pub fn bestmove_line(result: &Result<SearchResult, SearchError>) -> String {
    match result {
        Ok(result) => format!("bestmove {}", result.best_move.to_uci(CastlingMode::Standard)),
        Err(e) => {
            warn!(error = %e, "search produced no move");
            "bestmove 0000".to_string()
        }
    }
}
