//! Iterative deepening on top of the windowed negamax search.

pub mod aspiration;
pub mod compact;
pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use std::fmt;
use std::time::Duration;

use shakmaty::{CastlingMode, Chess, Move, Position};
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::eval::{Evaluation, Evaluator};
use control::SearchControl;
use negamax::{MATE_SCORE, MATE_THRESHOLD, SearchContext};
use ordering::MoveOrderer;
use tt::TranspositionTable;

/// Deepest iteration the searcher will start.
pub const MAX_DEPTH: u8 = 64;

/// Default transposition table size in megabytes.
pub const DEFAULT_HASH_MB: usize = 16;

/// Switches for the individual search techniques. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFeatures {
    /// Null-move pruning.
    pub null_move: bool,
    /// Late-move reductions.
    pub late_move_reductions: bool,
    /// Check and seventh-rank pawn extensions.
    pub extensions: bool,
    /// Aspiration windows between iterations.
    pub aspiration: bool,
}

impl Default for SearchFeatures {
    fn default() -> Self {
        Self {
            null_move: true,
            late_move_reductions: true,
            extensions: true,
            aspiration: true,
        }
    }
}

/// Searcher construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Transposition table budget in megabytes.
    pub hash_mb: usize,
    /// Enabled techniques.
    pub features: SearchFeatures,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            features: SearchFeatures::default(),
        }
    }
}

/// Per-call limits that are not time based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop after this iteration depth.
    pub depth: Option<u8>,
}

/// Counters collected during one `think`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered, main search and quiescence.
    pub nodes: u64,
    /// Static evaluations.
    pub leaves: u64,
    /// Null-move probes tried.
    pub null_move_tries: u64,
    /// Null-move probes that cut off.
    pub null_move_cutoffs: u64,
    /// Aspiration windows that failed and were searched again.
    pub aspiration_researches: u64,
    /// Reduced scouts that had to be searched again at full depth.
    pub lmr_researches: u64,
    /// Nodes answered from the transposition table.
    pub tt_cutoffs: u64,
}

/// Progress after each completed iteration.
#[derive(Debug, Clone)]
pub struct IterationInfo {
    /// Completed depth.
    pub depth: u8,
    /// Score for the side to move.
    pub score: i32,
    /// Best move of this iteration.
    pub best_move: Move,
    /// Time since the search started.
    pub elapsed: Duration,
    /// Nodes searched so far.
    pub nodes: u64,
    /// Static evaluations so far.
    pub leaves: u64,
    /// Table occupancy in per-mille.
    pub hashfull: u32,
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move to play.
    pub best_move: Move,
    /// Score of the last completed iteration, from the side to move.
    pub score: i32,
    /// Last completed depth; 0 when no iteration finished.
    pub depth: u8,
    /// Counters for the whole search.
    pub stats: SearchStats,
}

/// A score in the form UCI reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedScore {
    /// Centipawns from the side to move.
    Centipawns(i32),
    /// Mate in this many moves; negative when the side to move is mated.
    Mate(i32),
}

impl ReportedScore {
    /// Convert a search score; mate distances are rounded up to whole moves.
    pub fn from_score(score: i32) -> Self {
        if score.abs() < MATE_THRESHOLD {
            return ReportedScore::Centipawns(score);
        }
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        ReportedScore::Mate(if score > 0 { moves } else { -moves })
    }
}

impl fmt::Display for ReportedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedScore::Centipawns(cp) => write!(f, "cp {cp}"),
            ReportedScore::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Iterative-deepening searcher owning the table, the move-ordering
/// heuristics and the evaluator.
pub struct Searcher<E: Evaluator = Evaluation> {
    config: SearchConfig,
    tt: TranspositionTable,
    orderer: MoveOrderer,
    evaluator: E,
}

impl Searcher<Evaluation> {
    /// Searcher with the built-in evaluator.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_evaluator(config, Evaluation::default())
    }
}

impl<E: Evaluator> Searcher<E> {
    /// Searcher with a custom evaluator.
    pub fn with_evaluator(config: SearchConfig, evaluator: E) -> Self {
        Self {
            tt: TranspositionTable::new(config.hash_mb),
            orderer: MoveOrderer::new(),
            config,
            evaluator,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Change which techniques are used by later searches.
    pub fn set_features(&mut self, features: SearchFeatures) {
        self.config.features = features;
    }

    /// Replace the transposition table with an empty one of `mb` megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.config.hash_mb = mb;
        self.tt = TranspositionTable::new(mb);
    }

    /// Forget everything learned from the previous game.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.orderer.new_game();
    }

    /// The transposition table.
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// The evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Search `pos` until `limits` or `control` stop it.
    ///
    /// `game_history` holds the keys of the positions played before `pos`,
    /// oldest first, so repetitions of the game are scored as draws.
    /// `on_iter` runs after every completed iteration.
    pub fn think<F>(
        &mut self,
        pos: &Chess,
        limits: SearchLimits,
        control: &SearchControl,
        game_history: &[u64],
        mut on_iter: F,
    ) -> Result<SearchResult, SearchError>
    where
        F: FnMut(&IterationInfo),
    {
        let legal = pos.legal_moves();
        let Some(first_legal) = legal.first().cloned() else {
            return Err(SearchError::NoLegalMoves);
        };

        self.orderer.new_search();
        let max_depth = limits.depth.map_or(MAX_DEPTH, |d| d.clamp(1, MAX_DEPTH));
        let features = self.config.features;
        let mut ctx = SearchContext::new(
            control,
            &self.tt,
            &self.evaluator,
            &mut self.orderer,
            features,
            game_history,
        );

        let mut best_move: Option<Move> = None;
        let mut score = 0;
        let mut previous_score = 0;
        let mut completed_depth = 0;

        for depth in 1..=max_depth {
            if control.should_stop_iterating() {
                break;
            }

            ctx.set_root_hint(best_move.as_ref());
            let result =
                aspiration::aspiration_search(&mut ctx, pos, depth as i32, score, previous_score);
            let root_best = ctx.take_root_best();

            if control.is_cancelled() {
                if root_best.is_some() {
                    best_move = root_best;
                }
                debug!(depth, "iteration cancelled");
                break;
            }

            if root_best.is_some() {
                best_move = root_best;
            }
            previous_score = score;
            score = result;
            completed_depth = depth;

            let Some(iteration_best) = best_move.clone() else {
                continue;
            };
            let info = IterationInfo {
                depth,
                score,
                best_move: iteration_best,
                elapsed: control.elapsed(),
                nodes: ctx.stats.nodes,
                leaves: ctx.stats.leaves,
                hashfull: ctx.tt.hashfull(),
            };
            debug!(
                depth,
                score,
                nodes = info.nodes,
                best = %info.best_move.to_uci(CastlingMode::Standard),
                elapsed_ms = info.elapsed.as_millis() as u64,
                "iteration complete"
            );
            on_iter(&info);

            if score >= MATE_THRESHOLD {
                break;
            }
        }

        let stats = ctx.stats;
        let best_move = match best_move {
            Some(mv) => mv,
            None => {
                warn!("no completed root move, playing first legal move");
                first_legal
            }
        };

        info!(
            depth = completed_depth,
            score,
            nodes = stats.nodes,
            best = %best_move.to_uci(CastlingMode::Standard),
            "search finished"
        );

        Ok(SearchResult {
            best_move,
            score,
            depth: completed_depth,
            stats,
        })
    }
}

impl<E: Evaluator> fmt::Debug for Searcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("tt", &self.tt)
            .finish()
    }
}

impl Default for Searcher<Evaluation> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
