//! Search errors.

/// Errors returned by [`Searcher::think`](crate::Searcher::think).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The root position is checkmate or stalemate; there is nothing to play.
    #[error("position has no legal moves")]
    NoLegalMoves,
}
