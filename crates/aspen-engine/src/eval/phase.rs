//! Game phase and coarse material measures.

use shakmaty::{Board, Color};

/// Phase of a full opening complement of non-pawn material.
///
/// Weights: Knight=1, Bishop=1, Rook=2, Queen=4, so 4 + 4 + 8 + 8 = 24.
pub const MAX_PHASE: i32 = 24;

/// Phase from non-pawn, non-king material, clamped to `0..=MAX_PHASE`.
///
/// Promoted pieces cannot push the result above [`MAX_PHASE`].
pub fn game_phase(board: &Board) -> i32 {
    let knights = board.knights().count() as i32;
    let bishops = board.bishops().count() as i32;
    let rooks = board.rooks().count() as i32;
    let queens = board.queens().count() as i32;

    (knights + bishops + rooks * 2 + queens * 4).min(MAX_PHASE)
}

/// Non-pawn material of both colours, in flat centipawns.
///
/// Used to classify the game stage when sizing aspiration windows, where a
/// coarse piece count matters more than tuned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialSummary {
    /// Queens of both colours.
    pub queens: u32,
    /// Rooks of both colours.
    pub rooks: u32,
    /// Knights and bishops of both colours.
    pub minors: u32,
}

impl MaterialSummary {
    /// Count the pieces on `board`.
    pub fn of(board: &Board) -> Self {
        Self {
            queens: board.queens().count() as u32,
            rooks: board.rooks().count() as u32,
            minors: (board.knights().count() + board.bishops().count()) as u32,
        }
    }

    /// 900 per queen, 500 per rook, 300 per minor piece.
    pub fn total(self) -> i32 {
        (self.queens * 900 + self.rooks * 500 + self.minors * 300) as i32
    }
}

/// Only kings and pawns are left on the board.
pub fn is_pawn_endgame(board: &Board) -> bool {
    board.occupied().count() == board.pawns().count() + board.kings().count()
}

/// `color` owns at least one knight, bishop, rook or queen.
///
/// Null-move pruning is unsafe without one: king-and-pawn positions are where
/// zugzwang lives.
pub fn has_non_pawn_material(board: &Board, color: Color) -> bool {
    (board.by_color(color) & !board.pawns() & !board.kings()).any()
}
