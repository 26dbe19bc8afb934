//! Aspiration windows around the previous iteration's score.

use shakmaty::{Board, Chess, Position};
use tracing::{debug, trace};

use crate::eval::Evaluator;
use crate::eval::phase::{MaterialSummary, is_pawn_endgame};
use crate::search::negamax::{INF, MATE_THRESHOLD, Node, SearchContext};

/// Iterations at or below this depth always use the full window.
const MIN_ASPIRATION_DEPTH: i32 = 4;
/// Re-searches after which the failing bound is opened completely.
const OPEN_BOUND_AFTER: u32 = 3;
/// Re-searches after which a full-window search is forced.
const FULL_WINDOW_AFTER: u32 = 4;
/// Half-width beyond which the failing bound is opened completely.
const MAX_DELTA: i32 = 500;

/// Half-width of the window for the next iteration, or `None` to search
/// with the full window.
///
/// Material is counted as 900 per queen, 500 per rook and 300 per minor
/// piece for both colours:
///
/// | Stage | Condition | Delta |
/// |-------|-----------|-------|
/// | pawn or late endgame | no queens/rooks and at most one minor, or material < 1300 | none below 1000 or with only kings and pawns, else 200 |
/// | endgame | material < 2600 | 120, or 150 when volatility > 150 |
/// | middlegame | otherwise | 50, or 85 when volatility > 100 |
///
/// Volatility is `|score - previous|`, counted only past depth 5 and when a
/// previous score exists. A score beyond ±1000 floors the delta at 150, which
/// also re-enables a disabled window.
pub fn aspiration_delta(board: &Board, depth: i32, score: i32, previous: i32) -> Option<i32> {
    let material = MaterialSummary::of(board);
    let total = material.total();
    let volatility = if depth > 5 && previous != 0 {
        (score - previous).abs()
    } else {
        0
    };

    let pawn_endgame = material.queens == 0 && material.rooks == 0 && material.minors <= 1;
    let delta = if pawn_endgame || total < 1_300 {
        if total < 1_000 || is_pawn_endgame(board) {
            None
        } else {
            Some(200)
        }
    } else if total < 2_600 {
        Some(if volatility > 150 { 150 } else { 120 })
    } else {
        Some(if volatility > 100 { 85 } else { 50 })
    };

    if score.abs() > 1_000 {
        Some(delta.map_or(150, |d| d.max(150)))
    } else {
        delta
    }
}

/// Root search for one iteration, windowed around `score` when that is safe.
///
/// `score` is the previous iteration's result and `previous` the one before.
pub fn aspiration_search<E: Evaluator>(
    ctx: &mut SearchContext<'_, E>,
    pos: &Chess,
    depth: i32,
    score: i32,
    previous: i32,
) -> i32 {
    if !ctx.features.aspiration || depth <= MIN_ASPIRATION_DEPTH || score.abs() >= MATE_THRESHOLD {
        return full_window(ctx, pos, depth);
    }
    match aspiration_delta(pos.board(), depth, score, previous) {
        Some(delta) => windowed_search(ctx, pos, depth, score, delta),
        None => full_window(ctx, pos, depth),
    }
}

fn full_window<E: Evaluator>(ctx: &mut SearchContext<'_, E>, pos: &Chess, depth: i32) -> i32 {
    ctx.reset_root_best();
    ctx.search(pos, depth, -INF, INF, Node::ROOT)
}

/// Search `[center - delta, center + delta]`, widening on failure until the
/// result lands strictly inside the window.
pub fn windowed_search<E: Evaluator>(
    ctx: &mut SearchContext<'_, E>,
    pos: &Chess,
    depth: i32,
    center: i32,
    initial_delta: i32,
) -> i32 {
    let growth = if initial_delta >= 100 { 3 } else { 2 };
    let mut delta = initial_delta;
    let mut alpha = center - delta;
    let mut beta = center + delta;
    let mut researches = 0;

    loop {
        if researches >= FULL_WINDOW_AFTER {
            debug!(depth, researches, "aspiration falling back to full window");
            return full_window(ctx, pos, depth);
        }

        ctx.reset_root_best();
        let result = ctx.search(pos, depth, alpha, beta, Node::ROOT);
        if ctx.control.is_cancelled() || (alpha < result && result < beta) {
            return result;
        }

        researches += 1;
        ctx.stats.aspiration_researches += 1;
        delta *= growth;
        let open = researches >= OPEN_BOUND_AFTER || delta > MAX_DELTA;

        if result <= alpha {
            alpha = if open { -INF } else { center - delta };
            debug!(depth, result, alpha, beta, researches, "aspiration fail low");
        } else {
            beta = if open { INF } else { center + delta };
            debug!(depth, result, alpha, beta, researches, "aspiration fail high");
        }
        trace!(delta, open, "aspiration window widened");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Chess};

    use super::*;
    use crate::eval::Evaluation;
    use crate::search::SearchFeatures;
    use crate::search::control::SearchControl;
    use crate::search::ordering::MoveOrderer;
    use crate::search::tt::TranspositionTable;

    fn pos(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    fn board(fen: &str) -> Board {
        pos(fen).board().clone()
    }

    #[test]
    fn middlegame_window_is_narrow() {
        let b = Chess::default().board().clone();
        assert_eq!(aspiration_delta(&b, 6, 20, 10), Some(50));
        assert_eq!(aspiration_delta(&b, 6, 220, 10), Some(85));
        // Volatility ignored at shallow depth.
        assert_eq!(aspiration_delta(&b, 5, 220, 10), Some(50));
        // And when no previous score exists.
        assert_eq!(aspiration_delta(&b, 8, 220, 0), Some(50));
    }

    #[test]
    fn endgame_window_is_wider() {
        // Two rooks and two minors each side: 2 * (1000 + 600) = 3200 -> middlegame.
        // One rook and two minors each side: 2 * (500 + 600) = 2200 -> endgame.
        let b = board("2b1kn2/4r3/8/8/8/8/4R3/2B1KN2 w - - 0 1");
        assert_eq!(aspiration_delta(&b, 6, 0, 10), Some(120));
        assert_eq!(aspiration_delta(&b, 6, 200, 10), Some(150));
    }

    #[test]
    fn late_endgames_disable_or_widen() {
        let pawns = board("8/5k2/4p3/8/3P4/8/5K2/8 w - - 0 1");
        assert_eq!(aspiration_delta(&pawns, 8, 30, 20), None);

        // Rook and knight each: 1600 total, below 2600 but not a late endgame.
        let rook_knight = board("4k3/4r3/4n3/8/8/4N3/4R3/4K3 w - - 0 1");
        assert_eq!(aspiration_delta(&rook_knight, 8, 30, 20), Some(120));

        // Rook against rook: 1000, late endgame.
        let rooks = board("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(aspiration_delta(&rooks, 8, 30, 20), Some(200));

        // Single rook: 500, disabled.
        let rook = board("4k3/8/8/8/8/8/3R4/4K3 w - - 0 1");
        assert_eq!(aspiration_delta(&rook, 8, 30, 20), None);
    }

    #[test]
    fn decisive_score_floors_delta() {
        let b = Chess::default().board().clone();
        assert_eq!(aspiration_delta(&b, 6, 1_200, 1_150), Some(150));
        let pawns = board("8/5k2/4p3/8/3P4/8/5K2/8 w - - 0 1");
        assert_eq!(aspiration_delta(&pawns, 6, -1_500, -1_400), Some(150));
    }

    fn plain_features() -> SearchFeatures {
        SearchFeatures {
            null_move: false,
            late_move_reductions: false,
            extensions: false,
            aspiration: true,
        }
    }

    #[test]
    fn narrow_window_converges_to_full_window_result() {
        // Black's queen hangs to Nxh4.
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/4P2q/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");

        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let eval = Evaluation::default();

        let tt = TranspositionTable::new(1);
        let mut orderer = MoveOrderer::new();
        let mut ctx = SearchContext::new(&control, &tt, &eval, &mut orderer, plain_features(), &[]);
        let full = full_window(&mut ctx, &p, 4);
        let full_best = ctx.take_root_best().unwrap();

        let tt = TranspositionTable::new(1);
        let mut orderer = MoveOrderer::new();
        let mut ctx = SearchContext::new(&control, &tt, &eval, &mut orderer, plain_features(), &[]);
        let windowed = windowed_search(&mut ctx, &p, 4, 0, 10);
        let windowed_best = ctx.take_root_best().unwrap();

        assert!(ctx.stats.aspiration_researches > 0, "the narrow window must fail high");
        assert_eq!(windowed_best, full_best);
        assert_eq!(windowed, full);
        assert!(full > 500);
    }

    #[test]
    fn off_centre_window_recovers_the_same_score() {
        let p = pos("r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3");
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let eval = Evaluation::default();

        let tt = TranspositionTable::new(1);
        let mut orderer = MoveOrderer::new();
        let mut ctx = SearchContext::new(&control, &tt, &eval, &mut orderer, plain_features(), &[]);
        let full = full_window(&mut ctx, &p, 4);

        for center in [full + 37, full - 37] {
            let tt = TranspositionTable::new(1);
            let mut orderer = MoveOrderer::new();
            let mut ctx =
                SearchContext::new(&control, &tt, &eval, &mut orderer, plain_features(), &[]);
            let windowed = windowed_search(&mut ctx, &p, 4, center, 10);
            assert_eq!(windowed, full, "center {center}");
            assert!(ctx.take_root_best().is_some());
            assert!(ctx.stats.aspiration_researches > 0);
        }
    }

    #[test]
    fn result_inside_window_needs_no_research() {
        let p = Chess::default();
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let eval = Evaluation::default();
        let tt = TranspositionTable::new(1);
        let mut orderer = MoveOrderer::new();
        let mut ctx = SearchContext::new(&control, &tt, &eval, &mut orderer, plain_features(), &[]);
        let score = full_window(&mut ctx, &p, 3);
        let again = windowed_search(&mut ctx, &p, 3, score, 400);
        assert_eq!(ctx.stats.aspiration_researches, 0);
        assert!(again.abs() < 400 + score.abs());
    }
}
