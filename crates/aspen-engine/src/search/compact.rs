//! 16-bit move encoding for table storage.

use shakmaty::Move;

use crate::eval::role_index;

/// A move packed into 16 bits: `[15:12] promotion | [11:6] to | [5:0] from`.
///
/// Castling uses the king's origin and the rook's square, the same squares
/// `shakmaty` reports through [`Move::from`] and [`Move::to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompactMove(u16);

impl CompactMove {
    /// "No move". A1 to A1 is never a legal move, so all-zero bits are free.
    pub const NULL: CompactMove = CompactMove(0);

    /// Pack a legal move.
    pub fn from_move(mv: &Move) -> Self {
        let from = mv.from().map_or(0, |sq| sq as u16);
        let to = mv.to() as u16;
        let promo = mv.promotion().map_or(0, |role| role_index(role) as u16 + 1);
        CompactMove(from | (to << 6) | (promo << 12))
    }

    /// Raw bits.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Rebuild from raw bits.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        CompactMove(raw)
    }

    /// Whether this is [`CompactMove::NULL`].
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Origin square index.
    #[inline]
    pub const fn from_index(self) -> usize {
        (self.0 & 0x3F) as usize
    }

    /// Destination square index.
    #[inline]
    pub const fn to_index(self) -> usize {
        ((self.0 >> 6) & 0x3F) as usize
    }

    /// Whether `mv` packs to this value.
    #[inline]
    pub fn matches(self, mv: &Move) -> bool {
        !self.is_null() && self == CompactMove::from_move(mv)
    }
}

impl From<&Move> for CompactMove {
    fn from(mv: &Move) -> Self {
        CompactMove::from_move(mv)
    }
}
