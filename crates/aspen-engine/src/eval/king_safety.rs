//! King safety: pawn shield, a king stuck in the centre, and open files
//! next to the king.
//!
//! Everything here fades out towards the endgame.

use shakmaty::{Bitboard, Board, Color, File, Rank, Square};

use crate::eval::params::EvalParams;
use crate::eval::phase::MAX_PHASE;

/// Enemy piece-square total at which a central king takes the full
/// uncastled penalty.
const DEVELOPED: i32 = 130;

fn square_at(file: i32, rank: i32) -> Option<Square> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::from_coords(
            File::new(file as u32),
            Rank::new(rank as u32),
        ))
    } else {
        None
    }
}

/// Sum of shield penalties for a king on a wing.
///
/// A missing pawn directly in front costs the near score unless it stands
/// one square further up, which costs the smaller advanced score.
fn shield_gaps(king: Square, color: Color, own_pawns: Bitboard, scores: &[i32; 6]) -> i32 {
    let file = (king.file() as i32).clamp(1, 6);
    let rank = king.rank() as i32;
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };

    let mut gaps = 0;
    for (i, f) in (file - 1..=file + 1).enumerate() {
        let Some(near) = square_at(f, rank + forward) else {
            continue;
        };
        if own_pawns.contains(near) {
            continue;
        }
        let advanced = square_at(f, rank + 2 * forward).is_some_and(|sq| own_pawns.contains(sq));
        gaps += if advanced { scores[i + 3] } else { scores[i] };
    }
    gaps
}

/// Danger to `color`'s king, returned as a non-negative penalty.
///
/// `enemy_pst` is the enemy's tapered piece-square total without the king,
/// a rough measure of how developed its pieces are.
pub fn king_danger(
    board: &Board,
    color: Color,
    enemy_pst: i32,
    params: &EvalParams,
    phase: i32,
) -> i32 {
    let Some(king) = board.king_of(color) else {
        return 0;
    };
    let own_pawns = board.pawns() & board.by_color(color);
    let enemy = board.by_color(!color);
    let enemy_pawns = board.pawns() & enemy;
    let king_file = king.file() as i32;

    let mut danger = if king_file <= 2 || king_file >= 5 {
        let gaps = shield_gaps(king, color, own_pawns, &params.king_shield);
        gaps * gaps
    } else {
        params.uncastled_king * (enemy_pst + 10).clamp(0, DEVELOPED) / DEVELOPED
    };

    let enemy_rooks = (board.rooks() & enemy).count();
    let enemy_queens = (board.queens() & enemy).count();
    if enemy_rooks > 1 || (enemy_rooks > 0 && enemy_queens > 0) {
        let centre = king_file.clamp(1, 6);
        for file in centre - 1..=centre + 1 {
            let mask = Bitboard::from_file(File::new(file as u32));
            let king_on_file = file == king_file;
            if (enemy_pawns & mask).is_empty() {
                danger += if king_on_file {
                    params.semi_open_king_file
                } else {
                    params.semi_open_adjacent_file
                };
                if (own_pawns & mask).is_empty() {
                    danger += if king_on_file {
                        params.open_king_file
                    } else {
                        params.open_adjacent_file
                    };
                }
            }
        }
    }

    let scaled = danger * phase / MAX_PHASE;
    if enemy_queens == 0 {
        scaled * 67 / 100
    } else {
        scaled
    }
}
