//! Piece-square tables.
//!
//! Tables are written from White's point of view in LERF order (index 0 = A1,
//! index 63 = H8). Black squares are mirrored vertically with `^ 56`.

use shakmaty::{Color, Role, Square};

use crate::eval::role_index;
use crate::eval::score::{S, Score};

#[rustfmt::skip]
const PAWN: [Score; 64] = [
    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),
    S(4,6),    S(8,4),    S(8,4),    S(-18,2),  S(-18,2),  S(8,4),    S(8,4),    S(4,6),
    S(4,4),    S(-4,4),   S(-8,2),   S(2,2),    S(2,2),    S(-8,2),   S(-4,4),   S(4,4),
    S(0,10),   S(0,10),   S(2,8),    S(18,8),   S(18,8),   S(2,8),    S(0,10),   S(0,10),
    S(6,22),   S(6,22),   S(10,18),  S(22,16),  S(22,16),  S(10,18),  S(6,22),   S(6,22),
    S(12,46),  S(12,46),  S(20,42),  S(28,40),  S(28,40),  S(20,42),  S(12,46),  S(12,46),
    S(48,90),  S(48,90),  S(48,90),  S(48,90),  S(48,90),  S(48,90),  S(48,90),  S(48,90),
    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),
];

#[rustfmt::skip]
const KNIGHT: [Score; 64] = [
    S(-48,-44),S(-36,-34),S(-28,-26),S(-26,-24),S(-26,-24),S(-28,-26),S(-36,-34),S(-48,-44),
    S(-36,-32),S(-18,-16),S(2,-2),   S(4,2),    S(4,2),    S(2,-2),   S(-18,-16),S(-36,-32),
    S(-26,-24),S(4,-2),   S(12,8),   S(14,12),  S(14,12),  S(12,8),   S(4,-2),   S(-26,-24),
    S(-24,-20),S(2,4),    S(14,12),  S(22,18),  S(22,18),  S(14,12),  S(2,4),    S(-24,-20),
    S(-24,-20),S(6,4),    S(16,12),  S(24,18),  S(24,18),  S(16,12),  S(6,4),    S(-24,-20),
    S(-26,-24),S(2,-2),   S(12,8),   S(16,12),  S(16,12),  S(12,8),   S(2,-2),   S(-26,-24),
    S(-36,-32),S(-18,-16),S(0,-2),   S(2,2),    S(2,2),    S(0,-2),   S(-18,-16),S(-36,-32),
    S(-48,-44),S(-36,-34),S(-28,-26),S(-26,-24),S(-26,-24),S(-28,-26),S(-36,-34),S(-48,-44),
];

#[rustfmt::skip]
const BISHOP: [Score; 64] = [
    S(-18,-14),S(-8,-8),  S(-10,-8), S(-8,-6),  S(-8,-6),  S(-10,-8), S(-8,-8),  S(-18,-14),
    S(-8,-8),  S(8,-2),   S(2,0),    S(2,0),    S(2,0),    S(2,0),    S(8,-2),   S(-8,-8),
    S(-8,-6),  S(6,2),    S(6,4),    S(6,4),    S(6,4),    S(6,4),    S(6,2),    S(-8,-6),
    S(-8,-4),  S(4,2),    S(8,6),    S(12,8),   S(12,8),   S(8,6),    S(4,2),    S(-8,-4),
    S(-8,-4),  S(4,2),    S(8,6),    S(12,8),   S(12,8),   S(8,6),    S(4,2),    S(-8,-4),
    S(-8,-6),  S(2,2),    S(4,4),    S(6,4),    S(6,4),    S(4,4),    S(2,2),    S(-8,-6),
    S(-8,-8),  S(0,-2),   S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,-2),   S(-8,-8),
    S(-18,-14),S(-8,-8),  S(-10,-8), S(-8,-6),  S(-8,-6),  S(-10,-8), S(-8,-8),  S(-18,-14),
];

#[rustfmt::skip]
const ROOK: [Score; 64] = [
    S(-2,0),   S(-2,0),   S(2,0),    S(6,0),    S(6,0),    S(2,0),    S(-2,0),   S(-2,0),
    S(-6,-2),  S(-2,-2),  S(0,-2),   S(0,-2),   S(0,-2),   S(0,-2),   S(-2,-2),  S(-6,-2),
    S(-6,0),   S(-2,0),   S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(-2,0),   S(-6,0),
    S(-6,0),   S(-2,0),   S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(-2,0),   S(-6,0),
    S(-4,2),   S(0,2),    S(0,2),    S(2,2),    S(2,2),    S(0,2),    S(0,2),    S(-4,2),
    S(-2,4),   S(2,4),    S(4,4),    S(4,4),    S(4,4),    S(4,4),    S(2,4),    S(-2,4),
    S(14,10),  S(18,12),  S(18,12),  S(18,12),  S(18,12),  S(18,12),  S(18,12),  S(14,10),
    S(4,6),    S(4,6),    S(4,6),    S(6,6),    S(6,6),    S(4,6),    S(4,6),    S(4,6),
];

#[rustfmt::skip]
const QUEEN: [Score; 64] = [
    S(-18,-24),S(-10,-16),S(-8,-12), S(-4,-8),  S(-4,-8),  S(-8,-12), S(-10,-16),S(-18,-24),
    S(-10,-14),S(0,-6),   S(4,-4),   S(2,0),    S(2,0),    S(2,-4),   S(0,-6),   S(-10,-14),
    S(-8,-10), S(4,-2),   S(4,4),    S(4,6),    S(4,6),    S(4,4),    S(2,-2),   S(-8,-10),
    S(-4,-6),  S(0,2),    S(4,8),    S(4,12),   S(4,12),   S(4,8),    S(0,2),    S(-4,-6),
    S(-4,-6),  S(0,2),    S(4,8),    S(4,12),   S(4,12),   S(4,8),    S(0,2),    S(-4,-6),
    S(-8,-10), S(0,-2),   S(4,4),    S(4,6),    S(4,6),    S(4,4),    S(0,-2),   S(-8,-10),
    S(-10,-14),S(0,-6),   S(0,-4),   S(0,0),    S(0,0),    S(0,-4),   S(0,-6),   S(-10,-14),
    S(-18,-24),S(-10,-16),S(-8,-12), S(-4,-8),  S(-4,-8),  S(-8,-12), S(-10,-16),S(-18,-24),
];

#[rustfmt::skip]
const KING: [Score; 64] = [
    S(22,-46), S(32,-32), S(12,-24), S(-2,-20), S(2,-20),  S(8,-24),  S(34,-32), S(24,-46),
    S(18,-28), S(16,-16), S(-4,-8),  S(-8,-4),  S(-8,-4),  S(-4,-8),  S(16,-16), S(18,-28),
    S(-10,-20),S(-18,-4), S(-20,8),  S(-22,14), S(-22,14), S(-20,8),  S(-18,-4), S(-10,-20),
    S(-20,-16),S(-28,2),  S(-30,16), S(-40,24), S(-40,24), S(-30,16), S(-28,2),  S(-20,-16),
    S(-30,-16),S(-38,4),  S(-40,18), S(-50,26), S(-50,26), S(-40,18), S(-38,4),  S(-30,-16),
    S(-30,-20),S(-38,0),  S(-40,12), S(-50,18), S(-50,18), S(-40,12), S(-38,0),  S(-30,-20),
    S(-30,-28),S(-40,-12),S(-40,-4), S(-50,0),  S(-50,0),  S(-40,-4), S(-40,-12),S(-30,-28),
    S(-30,-48),S(-40,-32),S(-40,-24),S(-50,-20),S(-50,-20),S(-40,-24),S(-40,-32),S(-30,-48),
];

/// All tables, indexed by [`role_index`].
const TABLES: [&[Score; 64]; 6] = [&PAWN, &KNIGHT, &BISHOP, &ROOK, &QUEEN, &KING];

/// Piece-square value of `role` for `color` standing on `sq`.
pub fn pst_value(role: Role, color: Color, sq: Square) -> Score {
    let idx = match color {
        Color::White => sq as usize,
        Color::Black => sq as usize ^ 56,
    };
    TABLES[role_index(role)][idx]
}
