//! Passed and isolated pawns.
//!
//! Scores are for the given colour, positive when good for it.

use shakmaty::{Bitboard, Board, Color, File, Square};

use crate::eval::params::EvalParams;

/// Rank of `sq` counted from `color`'s back rank, 0..=7.
fn relative_rank(sq: Square, color: Color) -> usize {
    let rank = sq.rank() as usize;
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

/// Files directly left and right of `file`.
pub(crate) fn adjacent_files(file: File) -> Bitboard {
    let index = file as u32;
    let mut mask = Bitboard::EMPTY;
    if index > 0 {
        mask |= Bitboard::from_file(File::new(index - 1));
    }
    if index < 7 {
        mask |= Bitboard::from_file(File::new(index + 1));
    }
    mask
}

/// No enemy pawn ahead of `sq` on its own or an adjacent file.
pub fn is_passed(sq: Square, color: Color, enemy_pawns: Bitboard) -> bool {
    let span = Bitboard::from_file(sq.file()) | adjacent_files(sq.file());
    let own_rank = relative_rank(sq, color);
    (enemy_pawns & span)
        .into_iter()
        .all(|enemy| relative_rank(enemy, color) <= own_rank)
}

/// Passed-pawn bonuses plus the isolated-pawn score for `color`.
pub fn pawn_structure(board: &Board, color: Color, params: &EvalParams) -> i32 {
    let own = board.pawns() & board.by_color(color);
    let enemy = board.pawns() & board.by_color(!color);

    let mut score = 0;
    let mut isolated = 0usize;
    for sq in own {
        if is_passed(sq, color, enemy) {
            score += params.passed_pawn[relative_rank(sq, color)];
        }
        if (own & adjacent_files(sq.file())).is_empty() {
            isolated += 1;
        }
    }
    if isolated > 0 {
        score += params.isolated_pawns[isolated.min(4) - 1];
    }
    score
}

#[cfg(test)]
mod tests {
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Chess, Position};

    use super::*;

    fn board(fen: &str) -> Board {
        let fen: Fen = fen.parse().unwrap();
        let pos: Chess = fen.into_position(CastlingMode::Standard).unwrap();
        pos.board().clone()
    }

    #[test]
    fn starting_pawns_score_zero() {
        let b = Chess::default().board().clone();
        let params = EvalParams::default();
        assert_eq!(pawn_structure(&b, Color::White, &params), 0);
        assert_eq!(pawn_structure(&b, Color::Black, &params), 0);
    }

    #[test]
    fn passed_pawn_depends_on_files_ahead() {
        // d5 has nothing ahead on c-e. a7 and b2 stop each other.
        let b = board("4k3/p7/8/3P4/8/8/1P6/4K3 w - - 0 1");
        let black_pawns = b.pawns() & b.black();
        let white_pawns = b.pawns() & b.white();
        assert!(is_passed(Square::D5, Color::White, black_pawns));
        assert!(!is_passed(Square::B2, Color::White, black_pawns));
        assert!(!is_passed(Square::A7, Color::Black, white_pawns));

        let blocked = board("4k3/4p3/8/3P4/8/8/8/4K3 w - - 0 1");
        assert!(!is_passed(Square::D5, Color::White, blocked.pawns() & blocked.black()));
    }

    #[test]
    fn advanced_passer_scores_more() {
        let params = EvalParams::default();
        let far = board("6k1/3P4/8/8/8/8/8/4K3 w - - 0 1");
        let near = board("6k1/8/8/8/8/3P4/8/4K3 w - - 0 1");
        // Both are isolated as well; the passer bonus decides.
        let far_score = pawn_structure(&far, Color::White, &params);
        let near_score = pawn_structure(&near, Color::White, &params);
        assert_eq!(far_score, 120 - 10);
        assert_eq!(near_score, 15 - 10);
    }

    #[test]
    fn isolated_pawns_are_counted_once_per_pawn() {
        let params = EvalParams::default();
        // a2, c2 and e2 are isolated; the black pawns on a7/c7/e7 make none passed.
        let b = board("4k3/p1p1p3/8/8/8/8/P1P1P3/4K3 w - - 0 1");
        assert_eq!(pawn_structure(&b, Color::White, &params), -50);
        assert_eq!(pawn_structure(&b, Color::Black, &params), -50);
    }

    #[test]
    fn adjacent_files_at_the_edges() {
        assert_eq!(adjacent_files(File::A), Bitboard::from_file(File::B));
        assert_eq!(adjacent_files(File::H), Bitboard::from_file(File::G));
        assert_eq!(adjacent_files(File::D).count(), 16);
    }
}
