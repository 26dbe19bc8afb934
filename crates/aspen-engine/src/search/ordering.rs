//! Move ordering: TT hint, captures by exchange, promotions, killers, then
//! quiet moves by history and piece-square gain.

use std::cmp::Reverse;

use shakmaty::{Bitboard, Board, Chess, Color, Move, Position, Role};

use crate::eval::phase::game_phase;
use crate::eval::piece_value;
use crate::eval::pst::pst_value;
use crate::search::compact::CompactMove;
use crate::search::heuristics::{HistoryTable, KillerTable};

/// Move the table or the previous iteration suggested.
const TT_HINT: i32 = 100_000_000;
/// Capture of an equal or bigger piece, or of an undefended one.
const WINNING_CAPTURE: i32 = 8_000_000;
/// Added on top of the move's other score.
const PROMOTION: i32 = 6_000_000;
const KILLER: i32 = 4_000_000;
/// Capture that gives up material if recaptured.
const LOSING_CAPTURE: i32 = 2_000_000;

const HANGING_PIECE_PENALTY: i32 = 20;
const CASTLING_BONUS: i32 = 70;

/// Owns the killer and history tables and ranks moves with them.
#[derive(Default)]
pub struct MoveOrderer {
    killers: KillerTable,
    history: HistoryTable,
}

impl MoveOrderer {
    /// Empty killers and history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort `moves` best-first for a main-search node at `ply`.
    ///
    /// Ties keep generation order, so ordering is deterministic.
    pub fn order(&self, pos: &Chess, moves: &mut [Move], hint: CompactMove, ply: usize) {
        let board = pos.board();
        let us = pos.turn();
        let attacked = attacked_by(board, !us);
        let phase = game_phase(board);
        moves.sort_by_cached_key(|mv| {
            Reverse(self.score(mv, us, attacked, phase, hint, ply))
        });
    }

    /// Ordering score of a single move.
    fn score(
        &self,
        mv: &Move,
        us: Color,
        attacked: Bitboard,
        phase: i32,
        hint: CompactMove,
        ply: usize,
    ) -> i32 {
        let packed = CompactMove::from_move(mv);
        if hint.matches(mv) {
            return TT_HINT;
        }

        let mut score = 0;
        if let Some(victim) = mv.capture() {
            let delta = piece_value(victim) - piece_value(mv.role());
            let defended = attacked.contains(mv.to());
            score += if delta >= 0 || !defended {
                WINNING_CAPTURE + delta
            } else {
                LOSING_CAPTURE + delta
            };
        }
        if mv.is_promotion() {
            score += PROMOTION;
        }
        if mv.is_capture() || mv.is_promotion() {
            return score;
        }

        if self.killers.is_killer(ply, packed) {
            return KILLER;
        }

        score += self.history.score(us, packed.from_index(), packed.to_index());
        if mv.is_castle() {
            return score + CASTLING_BONUS;
        }
        if let Some(from) = mv.from() {
            let role = mv.role();
            score += pst_value(role, us, mv.to()).taper(phase) - pst_value(role, us, from).taper(phase);
            if role != Role::King && role != Role::Pawn && attacked.contains(mv.to()) {
                score -= HANGING_PIECE_PENALTY;
            }
        }
        score
    }

    /// Sort captures most-valuable-victim first, least-valuable-attacker second.
    pub fn order_captures(moves: &mut [Move]) {
        moves.sort_by_cached_key(|mv| Reverse(mvv_lva(mv)));
    }

    /// Book-keeping after `mv` failed high at `ply`.
    ///
    /// Only quiet moves are remembered. Killers are not kept for the root.
    pub fn record_cutoff(&mut self, side: Color, mv: &Move, ply: usize, depth: i32) {
        if mv.is_capture() || mv.is_promotion() {
            return;
        }
        let packed = CompactMove::from_move(mv);
        if ply > 0 {
            self.killers.store(ply, packed);
        }
        self.history
            .update_good(side, packed.from_index(), packed.to_index(), depth);
    }

    /// Start of a `think`: drop killers, age history.
    pub fn new_search(&mut self) {
        self.killers.clear();
        self.history.decay();
    }

    /// Start of a game: forget everything.
    pub fn new_game(&mut self) {
        self.killers.clear();
        self.history.clear();
    }

    /// Read access for diagnostics and tests.
    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Read access for diagnostics and tests.
    pub fn killers(&self) -> &KillerTable {
        &self.killers
    }
}

/// MVV-LVA key: victim dominates, cheaper attacker breaks ties.
pub fn mvv_lva(mv: &Move) -> i32 {
    let victim = mv.capture().map_or(0, piece_value);
    victim * 16 - piece_value(mv.role()) / 100
}

/// Squares attacked by `color`'s pieces.
fn attacked_by(board: &Board, color: Color) -> Bitboard {
    let mut attacked = Bitboard(0);
    for sq in board.by_color(color) {
        attacked |= board.attacks_from(sq);
    }
    attacked
}
