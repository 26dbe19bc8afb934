//! Negamax alpha-beta search with quiescence.
//!
//! Fail-hard: a cutoff returns `beta`, quiescence returns `alpha` when nothing
//! improves it. Scores are from the side to move at each node.

use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, Color, EnPassantMode, Move, Position, Rank, Role};

use crate::eval::phase::has_non_pawn_material;
use crate::eval::{Evaluator, piece_value};
use crate::search::compact::CompactMove;
use crate::search::control::SearchControl;
use crate::search::ordering::MoveOrderer;
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::{SearchFeatures, SearchStats};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 1_000_000;

/// Score of delivering mate at the root; a mate `n` plies away scores
/// `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 30_000;

/// Scores at or beyond this magnitude are forced mates.
pub const MATE_THRESHOLD: i32 = 29_000;

/// Maximum search depth (in plies) for array sizing and recursion limits.
pub const MAX_PLY: usize = 128;

/// Extension plies allowed along one path.
pub const MAX_EXTENSIONS: u8 = 13;

const SEARCH_POLL_INTERVAL: u64 = 1_000;
const QSEARCH_POLL_INTERVAL: u64 = 1_500;

/// Stand-pat deficit beyond which no single capture can recover.
const DELTA_MARGIN: i32 = 900;
/// Slack added to a capture's gain before it is skipped as futile.
const FUTILITY_MARGIN: i32 = 50;

/// Zobrist key used for the table and repetition detection.
pub fn position_key(pos: &Chess) -> u64 {
    pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

/// Per-node recursion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Distance from the root.
    pub ply: usize,
    /// Extension plies spent on the path to this node.
    pub extensions: u8,
    /// Whether a null move may be tried here.
    pub null_allowed: bool,
}

impl Node {
    /// The root node.
    pub const ROOT: Node = Node {
        ply: 0,
        extensions: 0,
        null_allowed: true,
    };

    /// Whether this is the root.
    #[inline]
    pub const fn is_root(self) -> bool {
        self.ply == 0
    }

    fn child(self, extension: i32) -> Node {
        Node {
            ply: self.ply + 1,
            extensions: self.extensions + extension as u8,
            null_allowed: true,
        }
    }

    fn after_null(self) -> Node {
        Node {
            ply: self.ply + 1,
            extensions: self.extensions,
            null_allowed: false,
        }
    }
}

/// Mutable state of one `think` call, threaded through the recursion.
pub struct SearchContext<'a, E: Evaluator> {
    pub(crate) control: &'a SearchControl,
    pub(crate) tt: &'a TranspositionTable,
    evaluator: &'a E,
    orderer: &'a mut MoveOrderer,
    pub(crate) features: SearchFeatures,
    /// Counters for diagnostics and tests.
    pub stats: SearchStats,
    last_search_poll: u64,
    last_qsearch_poll: u64,
    /// Keys of the game before the root, then the current search path.
    path: Vec<u64>,
    root_hint: CompactMove,
    root_best: Option<Move>,
}

impl<'a, E: Evaluator> SearchContext<'a, E> {
    /// Context for a search whose game so far produced `game_history`.
    pub fn new(
        control: &'a SearchControl,
        tt: &'a TranspositionTable,
        evaluator: &'a E,
        orderer: &'a mut MoveOrderer,
        features: SearchFeatures,
        game_history: &[u64],
    ) -> Self {
        let mut path = Vec::with_capacity(game_history.len() + MAX_PLY);
        path.extend_from_slice(game_history);
        Self {
            control,
            tt,
            evaluator,
            orderer,
            features,
            stats: SearchStats::default(),
            last_search_poll: 0,
            last_qsearch_poll: 0,
            path,
            root_hint: CompactMove::NULL,
            root_best: None,
        }
    }

    /// Move to try first at the root, normally the previous iteration's best.
    pub fn set_root_hint(&mut self, mv: Option<&Move>) {
        self.root_hint = mv.map_or(CompactMove::NULL, CompactMove::from_move);
    }

    /// Forget the best root move before a new root search.
    pub fn reset_root_best(&mut self) {
        self.root_best = None;
    }

    /// Best root move of the last root search, if any move raised alpha.
    pub fn take_root_best(&mut self) -> Option<Move> {
        self.root_best.take()
    }

    fn evaluate(&mut self, pos: &Chess) -> i32 {
        self.stats.leaves += 1;
        self.evaluator.evaluate(pos)
    }

    /// Same key seen earlier within the reversible part of the game.
    fn is_repetition(&self, pos: &Chess, key: u64) -> bool {
        self.path
            .iter()
            .rev()
            .take(pos.halfmoves() as usize)
            .any(|&k| k == key)
    }

    fn is_draw(&self, pos: &Chess, key: u64) -> bool {
        pos.halfmoves() >= 100 || pos.is_insufficient_material() || self.is_repetition(pos, key)
    }

    /// Alpha-beta search of `pos` to `depth` plies.
    pub fn search(&mut self, pos: &Chess, depth: i32, alpha: i32, beta: i32, node: Node) -> i32 {
        self.stats.nodes += 1;

        if self.stats.leaves - self.last_search_poll >= SEARCH_POLL_INTERVAL {
            self.last_search_poll = self.stats.leaves;
            self.control.poll();
        }
        if self.control.is_cancelled() {
            return 0;
        }

        let key = position_key(pos);
        let entry = self.tt.probe(key);
        let mut hint = entry.map_or(CompactMove::NULL, |e| e.best_move);
        if node.is_root() {
            if !self.root_hint.is_null() {
                hint = self.root_hint;
            }
        } else if let Some(value) =
            entry.and_then(|e| e.usable_value(depth.clamp(0, u8::MAX as i32) as u8, alpha, beta))
            && value.abs() < MATE_THRESHOLD
        {
            self.stats.tt_cutoffs += 1;
            return value;
        }

        if depth <= 0 {
            return self.quiesce(pos, alpha, beta, node.ply);
        }

        if node.ply >= MAX_PLY - 1 {
            return self.evaluate(pos);
        }

        let in_check = pos.is_check();
        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return if in_check {
                -(MATE_SCORE - node.ply as i32)
            } else {
                0
            };
        }
        if !node.is_root() && self.is_draw(pos, key) {
            return 0;
        }

        self.path.push(key);
        let score = self.expand(pos, key, &mut moves, hint, in_check, depth, alpha, beta, node);
        self.path.pop();
        score
    }

    /// Null-move probe and the move loop of an interior node.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        pos: &Chess,
        key: u64,
        moves: &mut [Move],
        hint: CompactMove,
        in_check: bool,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        node: Node,
    ) -> i32 {
        let us = pos.turn();

        if self.features.null_move
            && !node.is_root()
            && node.null_allowed
            && depth >= 3
            && !in_check
            && beta > -MATE_THRESHOLD
            && has_non_pawn_material(pos.board(), us)
            && let Ok(passed) = pos.clone().swap_turn()
        {
            let r = if depth < 5 {
                2
            } else if depth < 12 {
                3
            } else {
                6
            };
            self.stats.null_move_tries += 1;
            let score = -self.search(&passed, depth - r - 1, -beta, -beta + 1, node.after_null());
            if self.control.is_cancelled() {
                return 0;
            }
            if score >= beta && score.abs() < MATE_THRESHOLD {
                self.stats.null_move_cutoffs += 1;
                return beta;
            }
        }

        self.orderer.order(pos, moves, hint, node.ply);

        let alpha_at_entry = alpha;
        let mut best_score = -INF;
        let mut best_move = CompactMove::NULL;

        for (index, mv) in moves.iter().enumerate() {
            let mut child = pos.clone();
            child.play_unchecked(mv);

            let quiet = !mv.is_capture() && !mv.is_promotion();
            let extension = if self.features.extensions
                && node.extensions < MAX_EXTENSIONS
                && (child.is_check() || pawn_reaches_seventh(mv, us))
            {
                1
            } else {
                0
            };
            let child_node = node.child(extension);
            let new_depth = depth - 1 + extension;

            let score = if index == 0 {
                -self.search(&child, new_depth, -beta, -alpha, child_node)
            } else {
                let reduction = if self.features.late_move_reductions
                    && depth >= 3
                    && index > 3
                    && quiet
                    && extension == 0
                {
                    if index > 6 { 2 } else { 1 }
                } else {
                    0
                };
                let mut score =
                    -self.search(&child, new_depth - reduction, -alpha - 1, -alpha, child_node);
                if score > alpha && (reduction > 0 || score < beta) {
                    if reduction > 0 {
                        self.stats.lmr_researches += 1;
                    }
                    score = -self.search(&child, new_depth, -beta, -alpha, child_node);
                }
                score
            };

            if self.control.is_cancelled() {
                return 0;
            }

            if score >= beta {
                if quiet {
                    self.orderer.record_cutoff(us, mv, node.ply, depth);
                }
                if node.is_root() {
                    self.root_best = Some(mv.clone());
                }
                let stored_depth = depth.min(u8::MAX as i32) as u8;
                self.tt
                    .store(key, beta, stored_depth, Bound::LowerBound, CompactMove::from_move(mv));
                return beta;
            }

            if score > best_score {
                best_score = score;
                best_move = CompactMove::from_move(mv);
            }
            if score > alpha {
                alpha = score;
                if node.is_root() {
                    self.root_best = Some(mv.clone());
                }
            }
        }

        let bound = if best_score <= alpha_at_entry {
            Bound::UpperBound
        } else {
            Bound::Exact
        };
        self.tt
            .store(key, best_score, depth.min(u8::MAX as i32) as u8, bound, best_move);
        best_score
    }

    /// Capture-only search that settles tactics before trusting the
    /// static evaluation.
    pub fn quiesce(&mut self, pos: &Chess, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.stats.nodes += 1;

        if self.control.is_cancelled() {
            return 0;
        }
        if self.stats.leaves - self.last_qsearch_poll >= QSEARCH_POLL_INTERVAL {
            self.last_qsearch_poll = self.stats.leaves;
            self.control.poll();
        }

        if ply >= MAX_PLY {
            return self.evaluate(pos);
        }

        let in_check = pos.is_check();
        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return if in_check {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
        }
        if ply > 0
            && (pos.halfmoves() >= 100
                || pos.is_insufficient_material()
                || (pos.halfmoves() >= 4 && self.is_repetition(pos, position_key(pos))))
        {
            return 0;
        }

        let stand_pat = self.evaluate(pos);
        if stand_pat >= beta {
            return beta;
        }
        if !in_check && stand_pat < alpha - DELTA_MARGIN {
            return alpha;
        }
        alpha = alpha.max(stand_pat);

        if !in_check {
            moves.retain(|mv| mv.is_capture());
        }
        MoveOrderer::order_captures(&mut moves);

        for mv in moves.iter() {
            if !in_check && !mv.is_promotion() {
                let gain = mv.capture().map_or(0, piece_value);
                if stand_pat + gain + FUTILITY_MARGIN < alpha {
                    continue;
                }
            }

            let mut child = pos.clone();
            child.play_unchecked(mv);
            let score = -self.quiesce(&child, -beta, -alpha, ply + 1);

            if self.control.is_cancelled() {
                return stand_pat;
            }
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }

        alpha
    }
}

/// A pawn move landing on the mover's seventh rank.
fn pawn_reaches_seventh(mv: &Move, us: Color) -> bool {
    let seventh = match us {
        Color::White => Rank::Seventh,
        Color::Black => Rank::Second,
    };
    mv.role() == Role::Pawn && mv.to().rank() == seventh
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use shakmaty::fen::Fen;
    use shakmaty::uci::UciMove;
    use shakmaty::CastlingMode;

    use super::*;
    use crate::eval::Evaluation;

    fn pos(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    struct Fixture {
        control: SearchControl,
        tt: TranspositionTable,
        eval: Evaluation,
        orderer: MoveOrderer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                control: SearchControl::new_infinite(Arc::new(AtomicBool::new(false))),
                tt: TranspositionTable::new(1),
                eval: Evaluation::default(),
                orderer: MoveOrderer::new(),
            }
        }

        fn ctx(&mut self, history: &[u64]) -> SearchContext<'_, Evaluation> {
            SearchContext::new(
                &self.control,
                &self.tt,
                &self.eval,
                &mut self.orderer,
                SearchFeatures::default(),
                history,
            )
        }
    }

    #[test]
    fn mate_in_one_scores_by_ply() {
        let mut fx = Fixture::new();
        let p = pos("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        let mut ctx = fx.ctx(&[]);
        let score = ctx.search(&p, 2, -INF, INF, Node::ROOT);
        assert_eq!(score, MATE_SCORE - 1);
        let best = ctx.take_root_best().unwrap();
        assert_eq!(best.to_uci(CastlingMode::Standard).to_string(), "h5f7");
    }

    #[test]
    fn checkmated_side_scores_mated() {
        let mut fx = Fixture::new();
        // Fool's mate: White is mated.
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let mut ctx = fx.ctx(&[]);
        assert_eq!(ctx.quiesce(&p, -INF, INF, 3), -(MATE_SCORE - 3));
        assert_eq!(ctx.search(&p, 4, -INF, INF, Node { ply: 3, ..Node::ROOT }), -(MATE_SCORE - 3));
    }

    #[test]
    fn stalemate_scores_zero() {
        let mut fx = Fixture::new();
        let p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut ctx = fx.ctx(&[]);
        assert_eq!(ctx.search(&p, 3, -INF, INF, Node { ply: 1, ..Node::ROOT }), 0);
        assert_eq!(ctx.quiesce(&p, -INF, INF, 1), 0);
    }

    #[test]
    fn fifty_move_rule_is_a_draw_below_root() {
        let mut fx = Fixture::new();
        let p = pos("4k3/8/8/8/8/8/8/R3K3 w - - 100 80");
        let mut ctx = fx.ctx(&[]);
        assert_eq!(ctx.search(&p, 3, -INF, INF, Node { ply: 2, ..Node::ROOT }), 0);
    }

    #[test]
    fn repeated_position_is_a_draw() {
        let mut fx = Fixture::new();
        let start = pos("4k3/8/8/8/8/8/8/R3K3 w - - 10 40");
        let key = position_key(&start);
        let mut ctx = fx.ctx(&[key, 1, 2, 3]);
        // The same position four plies later counts as a repetition.
        assert_eq!(ctx.search(&start, 3, -INF, INF, Node { ply: 2, ..Node::ROOT }), 0);
    }

    #[test]
    fn history_outside_reversible_window_is_ignored() {
        let mut fx = Fixture::new();
        let start = pos("4k3/8/8/8/8/8/8/R3K3 w - - 2 40");
        let key = position_key(&start);
        let mut ctx = fx.ctx(&[key, 1, 2, 3]);
        assert!(ctx.search(&start, 2, -INF, INF, Node { ply: 2, ..Node::ROOT }) > 0);
    }

    #[test]
    fn depth_zero_equals_quiescence() {
        let p = pos("r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3");
        let mut a = Fixture::new();
        let via_search = a.ctx(&[]).search(&p, 0, -INF, INF, Node::ROOT);
        let mut b = Fixture::new();
        let via_quiesce = b.ctx(&[]).quiesce(&p, -INF, INF, 0);
        assert_eq!(via_search, via_quiesce);
    }

    #[test]
    fn quiescence_sees_hanging_queen() {
        let mut fx = Fixture::new();
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/4P2q/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        let mut ctx = fx.ctx(&[]);
        let stand_pat = Evaluation::default().evaluate(&p);
        assert!(ctx.quiesce(&p, -INF, INF, 0) > stand_pat + 500);
    }

    #[test]
    fn fail_hard_returns_beta_on_cutoff() {
        let mut fx = Fixture::new();
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/4P2q/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        let mut ctx = fx.ctx(&[]);
        assert_eq!(ctx.search(&p, 2, -10, 10, Node::ROOT), 10);
        assert_eq!(ctx.quiesce(&p, -10, 10, 0), 10);
    }

    #[test]
    fn cancelled_search_returns_zero_and_stores_nothing() {
        let mut fx = Fixture::new();
        fx.control.stop();
        let p = Chess::default();
        let mut ctx = fx.ctx(&[]);
        assert_eq!(ctx.search(&p, 5, -INF, INF, Node::ROOT), 0);
        assert!(ctx.take_root_best().is_none());
        drop(ctx);
        assert_eq!(fx.tt.filled(), 0);
    }

    #[test]
    fn root_hint_is_searched_and_search_fills_table() {
        let mut fx = Fixture::new();
        let p = Chess::default();
        let hint: Move = "a2a3".parse::<UciMove>().unwrap().to_move(&p).unwrap();
        let mut ctx = fx.ctx(&[]);
        ctx.set_root_hint(Some(&hint));
        ctx.search(&p, 3, -INF, INF, Node::ROOT);
        assert!(ctx.take_root_best().is_some());
        assert!(ctx.stats.nodes > 20);
        drop(ctx);
        let root = fx.tt.probe(position_key(&p)).expect("root is stored");
        assert_eq!(root.depth, 3);
        assert_eq!(root.bound, Bound::Exact);
    }

    #[test]
    fn seventh_rank_detection_is_relative() {
        let white = pos("4k3/8/4P3/8/8/8/8/4K3 w - - 0 1");
        let push: Move = "e6e7".parse::<UciMove>().unwrap().to_move(&white).unwrap();
        assert!(pawn_reaches_seventh(&push, Color::White));

        let black = pos("4k3/8/8/8/8/4p3/8/K7 b - - 0 1");
        let push: Move = "e3e2".parse::<UciMove>().unwrap().to_move(&black).unwrap();
        assert!(pawn_reaches_seventh(&push, Color::Black));
    }
}
