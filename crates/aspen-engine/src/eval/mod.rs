//! Static evaluation.
//!
//! The search only relies on the [`Evaluator`] trait. [`Evaluation`] is the
//! built-in hand-crafted evaluator: tapered material and piece-square tables,
//! a bishop-pair bonus, pawn structure, king safety and a mop-up term for won
//! endgames.

pub mod king_safety;
pub mod params;
pub mod pawns;
pub mod phase;
pub mod pst;
pub mod score;

use shakmaty::{Board, Chess, Color, Position, Role, Square};

use king_safety::king_danger;
use params::EvalParams;
use pawns::pawn_structure;
use phase::{MAX_PHASE, game_phase};
use pst::pst_value;
use score::{S, Score};

/// Scores a position for the side to move.
///
/// Implementations must be pure and deterministic, symmetric under a colour
/// swap, and stay far below the mate range (|score| < 29000).
pub trait Evaluator {
    /// Centipawn score from the point of view of the side to move.
    fn evaluate(&self, pos: &Chess) -> i32;
}

/// Flat piece values used by move ordering and quiescence pruning.
pub const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

/// Index of `role` into six-element per-piece tables (Pawn = 0 … King = 5).
#[inline]
pub fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// Flat value of `role` from [`PIECE_VALUES`].
#[inline]
pub fn piece_value(role: Role) -> i32 {
    PIECE_VALUES[role_index(role)]
}

/// Hand-crafted evaluator driven by [`EvalParams`].
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    params: EvalParams,
}

impl Evaluation {
    /// Evaluator using the given weights.
    pub fn with_params(params: EvalParams) -> Self {
        Self { params }
    }

    /// Current weights.
    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    fn material(&self, role: Role) -> Score {
        match role {
            Role::King => Score::ZERO,
            _ => {
                let i = role_index(role);
                S(self.params.material_mg[i] as i16, self.params.material_eg[i] as i16)
            }
        }
    }

    /// White-relative mop-up: once one side is clearly ahead in the endgame,
    /// drive the losing king to the rim and walk the winning king towards it.
    fn mop_up(&self, board: &Board, white_material: i32, black_material: i32, phase: i32) -> i32 {
        let (winner, lead) = if white_material > black_material {
            (Color::White, white_material - black_material)
        } else {
            (Color::Black, black_material - white_material)
        };
        if lead < 2 * self.params.material_eg[0] {
            return 0;
        }
        let (Some(own_king), Some(their_king)) = (board.king_of(winner), board.king_of(!winner))
        else {
            return 0;
        };

        let proximity = 14 - manhattan(own_king, their_king);
        let corner = centre_distance(their_king);
        let raw = proximity * self.params.mop_up_proximity + corner * self.params.mop_up_corner;
        let scaled = raw * (MAX_PHASE - phase) / MAX_PHASE;

        match winner {
            Color::White => scaled,
            Color::Black => -scaled,
        }
    }
}

impl Evaluator for Evaluation {
    fn evaluate(&self, pos: &Chess) -> i32 {
        let board = pos.board();
        let phase = game_phase(board);

        let mut score = Score::ZERO;
        let mut white_material = 0;
        let mut black_material = 0;
        let mut white_pst = Score::ZERO;
        let mut black_pst = Score::ZERO;

        for sq in board.occupied() {
            let Some(piece) = board.piece_at(sq) else {
                continue;
            };
            let material = self.material(piece.role);
            let pst = pst_value(piece.role, piece.color, sq);
            let (pst_total, material_total) = match piece.color {
                Color::White => {
                    score += material + pst;
                    (&mut white_pst, &mut white_material)
                }
                Color::Black => {
                    score -= material + pst;
                    (&mut black_pst, &mut black_material)
                }
            };
            *material_total += material.eg() as i32;
            if piece.role != Role::King {
                *pst_total += pst;
            }
        }

        let pair = S(self.params.bishop_pair_mg as i16, self.params.bishop_pair_eg as i16);
        if (board.bishops() & board.white()).count() >= 2 {
            score += pair;
        }
        if (board.bishops() & board.black()).count() >= 2 {
            score -= pair;
        }

        let params = &self.params;
        let pawns = pawn_structure(board, Color::White, params)
            - pawn_structure(board, Color::Black, params);
        let king = king_danger(board, Color::Black, white_pst.taper(phase), params, phase)
            - king_danger(board, Color::White, black_pst.taper(phase), params, phase);

        let white_relative = score.taper(phase)
            + pawns
            + king
            + self.mop_up(board, white_material, black_material, phase);

        match pos.turn() {
            Color::White => white_relative,
            Color::Black => -white_relative,
        }
    }
}

fn manhattan(a: Square, b: Square) -> i32 {
    let files = (a.file() as i32 - b.file() as i32).abs();
    let ranks = (a.rank() as i32 - b.rank() as i32).abs();
    files + ranks
}

fn centre_distance(sq: Square) -> i32 {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    (3 - file).max(file - 4) + (3 - rank).max(rank - 4)
}
