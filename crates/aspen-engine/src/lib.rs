//! Game-tree search for chess.
//!
//! Board representation and move generation come from `shakmaty`; this crate
//! adds evaluation, the transposition table, move ordering, time management
//! and the iterative-deepening alpha-beta search.

pub mod error;
pub mod eval;
pub mod search;
pub mod time;

pub use error::SearchError;
pub use eval::{Evaluation, Evaluator};
pub use search::compact::CompactMove;
pub use search::control::SearchControl;
pub use search::negamax::{INF, MATE_SCORE, MATE_THRESHOLD, position_key};
pub use search::tt::{Bound, TranspositionTable, TtEntry};
pub use search::{
    IterationInfo, ReportedScore, SearchConfig, SearchFeatures, SearchLimits, SearchResult,
    SearchStats, Searcher,
};
pub use time::{DEFAULT_MOVE_OVERHEAD, clock_limits, fixed_move_time, limits_from_go};
