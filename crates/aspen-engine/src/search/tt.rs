//! Transposition table with XOR-based torn-write detection.
//!
//! One slot per index, always-replace. Each slot is two `AtomicU64` words:
//!
//! ```text
//! word0: key ^ data
//! word1: data
//!   bits 57-42: best move  (CompactMove, 16 bits)
//!   bits 41-40: bound      (2 bits, 0 = empty slot)
//!   bits 39-32: depth      (8 bits)
//!   bits 31-0:  value      (i32)
//! ```
//!
//! A probe recomputes `word0 ^ word1` and compares it with the full 64-bit
//! key. A write torn between the two stores fails that test and reads as a
//! miss, so a racing reader can lose an entry but never trust a corrupt one.
//! All atomic accesses use `Relaxed` ordering.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::search::compact::CompactMove;

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<TranspositionTable>();
    }
    let _ = check;
};

/// How a stored value relates to the true score of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// The value is exact.
    Exact = 1,
    /// The true score is at least the value (the node failed high).
    LowerBound = 2,
    /// The true score is at most the value (no move raised alpha).
    UpperBound = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Option<Self> {
        match bits & 0x03 {
            1 => Some(Bound::Exact),
            2 => Some(Bound::LowerBound),
            3 => Some(Bound::UpperBound),
            _ => None,
        }
    }
}

/// A decoded table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    /// Full Zobrist key of the stored position.
    pub key: u64,
    /// Stored search value.
    pub value: i32,
    /// Remaining depth the value was searched to.
    pub depth: u8,
    /// Bound type.
    pub bound: Bound,
    /// Best or refutation move, [`CompactMove::NULL`] when none was found.
    pub best_move: CompactMove,
}

impl TtEntry {
    /// The value, when the entry was searched at least `depth` deep and its
    /// bound settles the `[alpha, beta]` window.
    pub fn usable_value(&self, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let usable = match self.bound {
            Bound::Exact => true,
            Bound::LowerBound => self.value >= beta,
            Bound::UpperBound => self.value <= alpha,
        };
        usable.then_some(self.value)
    }

    fn pack(&self) -> u64 {
        (self.value as u32 as u64)
            | (self.depth as u64) << 32
            | (self.bound as u64) << 40
            | (self.best_move.raw() as u64) << 42
    }

    fn unpack(key: u64, data: u64) -> Option<Self> {
        let bound = Bound::from_bits(data >> 40)?;
        Some(TtEntry {
            key,
            value: data as u32 as i32,
            depth: (data >> 32) as u8,
            bound,
            best_move: CompactMove::from_raw((data >> 42) as u16),
        })
    }
}

struct Slot {
    word0: AtomicU64,
    word1: AtomicU64,
}

impl Slot {
    const fn new() -> Self {
        Self {
            word0: AtomicU64::new(0),
            word1: AtomicU64::new(0),
        }
    }
}

/// Position-keyed cache of earlier search results.
///
/// All receivers are `&self`; the table may be shared across threads.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    filled: AtomicUsize,
}

impl TranspositionTable {
    /// Table using roughly `mb` megabytes (16 bytes per slot, at least one slot).
    pub fn new(mb: usize) -> Self {
        let bytes = mb.saturating_mul(1024 * 1024);
        let len = (bytes / std::mem::size_of::<Slot>()).max(1);
        let slots: Box<[Slot]> = (0..len).map(|_| Slot::new()).collect();
        Self {
            slots,
            filled: AtomicUsize::new(0),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a table has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn slot(&self, key: u64) -> &Slot {
        &self.slots[(key % self.slots.len() as u64) as usize]
    }

    /// Entry stored for exactly `key`, if any.
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        let slot = self.slot(key);
        let word0 = slot.word0.load(Ordering::Relaxed);
        let word1 = slot.word1.load(Ordering::Relaxed);
        if word0 ^ word1 != key {
            return None;
        }
        TtEntry::unpack(key, word1)
    }

    /// Overwrite the slot for `key`.
    pub fn store(&self, key: u64, value: i32, depth: u8, bound: Bound, best_move: CompactMove) {
        let entry = TtEntry {
            key,
            value,
            depth,
            bound,
            best_move,
        };
        let data = entry.pack();
        let slot = self.slot(key);
        if (slot.word1.load(Ordering::Relaxed) >> 40) & 0x03 == 0 {
            self.filled.fetch_add(1, Ordering::Relaxed);
        }
        slot.word0.store(key ^ data, Ordering::Relaxed);
        slot.word1.store(data, Ordering::Relaxed);
    }

    /// The stored value, when it was searched at least `depth` deep and its
    /// bound settles the `[alpha, beta]` window.
    pub fn try_use_bound(&self, key: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        self.probe(key)?.usable_value(depth, alpha, beta)
    }

    /// Empty every slot.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.word0.store(0, Ordering::Relaxed);
            slot.word1.store(0, Ordering::Relaxed);
        }
        self.filled.store(0, Ordering::Relaxed);
    }

    /// Slots written since the last clear. Approximate under concurrent writes.
    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::Relaxed)
    }

    /// Occupancy in per-mille, as reported by UCI `hashfull`.
    pub fn hashfull(&self) -> u32 {
        let permille = self.filled().saturating_mul(1000) / self.slots.len();
        permille.min(1000) as u32
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("filled", &self.filled())
            .finish()
    }
}
