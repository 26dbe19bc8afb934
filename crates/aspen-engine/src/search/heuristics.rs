//! Killer move table and history heuristic for quiet move ordering.

use shakmaty::Color;

use crate::search::compact::CompactMove;
use crate::search::negamax::MAX_PLY;

/// Two killer moves per ply: quiet moves that caused beta cutoffs.
pub struct KillerTable {
    slots: [[CompactMove; 2]; MAX_PLY],
}

impl KillerTable {
    /// Create an empty killer table.
    pub fn new() -> Self {
        Self {
            slots: [[CompactMove::NULL; 2]; MAX_PLY],
        }
    }

    /// Store a killer move at the given ply.
    ///
    /// Shifts slot 0 to slot 1 if the new move differs from slot 0.
    pub fn store(&mut self, ply: usize, mv: CompactMove) {
        if ply >= MAX_PLY {
            return;
        }
        if self.slots[ply][0] != mv {
            self.slots[ply][1] = self.slots[ply][0];
            self.slots[ply][0] = mv;
        }
    }

    /// Check if a move is a killer at the given ply.
    pub fn is_killer(&self, ply: usize, mv: CompactMove) -> bool {
        if ply >= MAX_PLY || mv.is_null() {
            return false;
        }
        self.slots[ply][0] == mv || self.slots[ply][1] == mv
    }

    /// Forget every killer.
    pub fn clear(&mut self) {
        self.slots = [[CompactMove::NULL; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Saturation point for history scores.
///
/// Keeps a quiet move's ordering score below the losing-capture band.
pub const HISTORY_MAX: i32 = 1_000_000;

/// Divisor applied to every history score at the start of a search.
const HISTORY_DECAY: i32 = 8;

/// History heuristic table, indexed by `[side][from][to]`.
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    /// Create a zeroed history table.
    pub fn new() -> Self {
        Self {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    /// Reward a quiet move that caused a beta cutoff with `depth²`.
    pub fn update_good(&mut self, side: Color, from: usize, to: usize, depth: i32) {
        let bonus = depth.max(0) * depth.max(0);
        let entry = &mut self.table[side as usize][from][to];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    /// History score for a quiet move.
    pub fn score(&self, side: Color, from: usize, to: usize) -> i32 {
        self.table[side as usize][from][to]
    }

    /// Shrink every entry so recent cutoffs outweigh old ones.
    pub fn decay(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten() {
            *entry /= HISTORY_DECAY;
        }
    }

    /// Zero every entry.
    pub fn clear(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten() {
            *entry = 0;
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: u16, to: u16) -> CompactMove {
        CompactMove::from_raw(from | (to << 6))
    }

    #[test]
    fn killer_store_and_check() {
        let mut kt = KillerTable::new();
        let mv1 = mv(12, 28);
        let mv2 = mv(11, 27);

        kt.store(5, mv1);
        assert!(kt.is_killer(5, mv1));
        assert!(!kt.is_killer(5, mv2));

        kt.store(5, mv2);
        assert!(kt.is_killer(5, mv1));
        assert!(kt.is_killer(5, mv2));
    }

    #[test]
    fn killer_keeps_two_most_recent() {
        let mut kt = KillerTable::new();
        let (a, b, c) = (mv(12, 28), mv(11, 27), mv(6, 21));
        kt.store(0, a);
        kt.store(0, b);
        kt.store(0, b);
        assert!(kt.is_killer(0, a), "repeating slot 0 must not evict slot 1");
        kt.store(0, c);
        assert!(!kt.is_killer(0, a));
        assert!(kt.is_killer(0, b));
        assert!(kt.is_killer(0, c));
    }

    #[test]
    fn killer_different_plies_independent() {
        let mut kt = KillerTable::new();
        let m = mv(12, 28);
        kt.store(3, m);
        assert!(kt.is_killer(3, m));
        assert!(!kt.is_killer(4, m));
        assert!(!kt.is_killer(MAX_PLY, m));
    }

    #[test]
    fn killer_clear_forgets_everything() {
        let mut kt = KillerTable::new();
        kt.store(2, mv(1, 2));
        kt.clear();
        assert!(!kt.is_killer(2, mv(1, 2)));
        assert!(!kt.is_killer(2, CompactMove::NULL));
    }

    #[test]
    fn history_accumulates_depth_squared() {
        let mut ht = HistoryTable::new();
        assert_eq!(ht.score(Color::White, 6, 21), 0);
        ht.update_good(Color::White, 6, 21, 4);
        ht.update_good(Color::White, 6, 21, 3);
        assert_eq!(ht.score(Color::White, 6, 21), 25);
        assert_eq!(ht.score(Color::Black, 6, 21), 0, "sides are separate");
    }

    #[test]
    fn history_saturates() {
        let mut ht = HistoryTable::new();
        for _ in 0..20_000 {
            ht.update_good(Color::Black, 0, 1, 60);
        }
        assert_eq!(ht.score(Color::Black, 0, 1), HISTORY_MAX);
    }

    #[test]
    fn history_decay_and_clear() {
        let mut ht = HistoryTable::new();
        ht.update_good(Color::White, 1, 18, 9);
        ht.decay();
        assert_eq!(ht.score(Color::White, 1, 18), 81 / 8);
        ht.clear();
        assert_eq!(ht.score(Color::White, 1, 18), 0);
    }
}
