//! Evaluation weights and the registry that exposes them to tuning tools.
//!
//! Every weight a tuner may touch is listed once in [`PARAMETERS`] as a
//! (name, getter, setter, bounds) descriptor, so tools iterate a static slice
//! instead of discovering fields at run time.

/// Weights read by [`Evaluation`](crate::eval::Evaluation).
///
/// Material arrays are indexed Pawn, Knight, Bishop, Rook, Queen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalParams {
    /// Middlegame material values.
    pub material_mg: [i32; 5],
    /// Endgame material values.
    pub material_eg: [i32; 5],
    /// Middlegame bonus for owning both bishops.
    pub bishop_pair_mg: i32,
    /// Endgame bonus for owning both bishops.
    pub bishop_pair_eg: i32,
    /// Mop-up reward per step the winning king closes on the losing king.
    pub mop_up_proximity: i32,
    /// Mop-up reward per step the losing king is pushed from the centre.
    pub mop_up_corner: i32,
    /// Passed-pawn bonus by rank, counted from the pawn's own side.
    pub passed_pawn: [i32; 8],
    /// Total isolated-pawn score for one to four isolated pawns; more count
    /// as four.
    pub isolated_pawns: [i32; 4],
    /// Missing shield pawn penalties: left, centre, right for the rank in
    /// front of the king, then the same files when the pawn has advanced
    /// one square.
    pub king_shield: [i32; 6],
    /// Largest penalty for a king left in the centre.
    pub uncastled_king: i32,
    /// Enemy-pawn-free king file while the enemy has heavy pieces.
    pub semi_open_king_file: i32,
    /// Enemy-pawn-free file next to the king.
    pub semi_open_adjacent_file: i32,
    /// Extra penalty when the king file has no pawns at all.
    pub open_king_file: i32,
    /// Extra penalty when a file next to the king has no pawns at all.
    pub open_adjacent_file: i32,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            material_mg: [100, 320, 330, 500, 900],
            material_eg: [120, 300, 320, 520, 940],
            bishop_pair_mg: 30,
            bishop_pair_eg: 50,
            mop_up_proximity: 4,
            mop_up_corner: 10,
            passed_pawn: [0, 15, 15, 30, 50, 80, 120, 0],
            isolated_pawns: [-10, -25, -50, -75],
            king_shield: [4, 7, 4, 3, 6, 3],
            uncastled_king: 50,
            semi_open_king_file: 25,
            semi_open_adjacent_file: 15,
            open_king_file: 15,
            open_adjacent_file: 10,
        }
    }
}

/// One tunable weight.
#[derive(Clone, Copy)]
pub struct ParamDescriptor {
    /// Stable name used by tuning tools and logs.
    pub name: &'static str,
    /// Read the current value.
    pub get: fn(&EvalParams) -> i32,
    /// Overwrite the value without bounds checking.
    pub set: fn(&mut EvalParams, i32),
    /// Smallest sensible value.
    pub min: i32,
    /// Largest sensible value.
    pub max: i32,
}

impl ParamDescriptor {
    /// Set `value` clamped into `min..=max`, returning what was stored.
    pub fn set_clamped(&self, params: &mut EvalParams, value: i32) -> i32 {
        let value = value.clamp(self.min, self.max);
        (self.set)(params, value);
        value
    }
}

impl std::fmt::Debug for ParamDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamDescriptor")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

macro_rules! descriptor {
    ($name:literal, $min:expr, $max:expr, |$p:ident| $place:expr) => {
        ParamDescriptor {
            name: $name,
            get: |$p: &EvalParams| $place,
            set: |$p: &mut EvalParams, value: i32| $place = value,
            min: $min,
            max: $max,
        }
    };
}

/// Every tunable weight, in a fixed order.
pub static PARAMETERS: &[ParamDescriptor] = &[
    descriptor!("pawn_mg", 50, 200, |p| p.material_mg[0]),
    descriptor!("knight_mg", 200, 450, |p| p.material_mg[1]),
    descriptor!("bishop_mg", 200, 450, |p| p.material_mg[2]),
    descriptor!("rook_mg", 350, 700, |p| p.material_mg[3]),
    descriptor!("queen_mg", 700, 1200, |p| p.material_mg[4]),
    descriptor!("pawn_eg", 50, 200, |p| p.material_eg[0]),
    descriptor!("knight_eg", 200, 450, |p| p.material_eg[1]),
    descriptor!("bishop_eg", 200, 450, |p| p.material_eg[2]),
    descriptor!("rook_eg", 350, 700, |p| p.material_eg[3]),
    descriptor!("queen_eg", 700, 1200, |p| p.material_eg[4]),
    descriptor!("bishop_pair_mg", 0, 100, |p| p.bishop_pair_mg),
    descriptor!("bishop_pair_eg", 0, 100, |p| p.bishop_pair_eg),
    descriptor!("mop_up_proximity", 0, 20, |p| p.mop_up_proximity),
    descriptor!("mop_up_corner", 0, 40, |p| p.mop_up_corner),
    descriptor!("passed_rank2", 0, 100, |p| p.passed_pawn[1]),
    descriptor!("passed_rank3", 0, 100, |p| p.passed_pawn[2]),
    descriptor!("passed_rank4", 0, 150, |p| p.passed_pawn[3]),
    descriptor!("passed_rank5", 0, 200, |p| p.passed_pawn[4]),
    descriptor!("passed_rank6", 0, 250, |p| p.passed_pawn[5]),
    descriptor!("passed_rank7", 0, 300, |p| p.passed_pawn[6]),
    descriptor!("isolated_1", -100, 0, |p| p.isolated_pawns[0]),
    descriptor!("isolated_2", -150, 0, |p| p.isolated_pawns[1]),
    descriptor!("isolated_3", -200, 0, |p| p.isolated_pawns[2]),
    descriptor!("isolated_4", -250, 0, |p| p.isolated_pawns[3]),
    descriptor!("shield_left", 0, 20, |p| p.king_shield[0]),
    descriptor!("shield_centre", 0, 20, |p| p.king_shield[1]),
    descriptor!("shield_right", 0, 20, |p| p.king_shield[2]),
    descriptor!("shield_left_advanced", 0, 20, |p| p.king_shield[3]),
    descriptor!("shield_centre_advanced", 0, 20, |p| p.king_shield[4]),
    descriptor!("shield_right_advanced", 0, 20, |p| p.king_shield[5]),
    descriptor!("uncastled_king", 0, 150, |p| p.uncastled_king),
    descriptor!("semi_open_king_file", 0, 80, |p| p.semi_open_king_file),
    descriptor!("semi_open_adjacent_file", 0, 80, |p| p.semi_open_adjacent_file),
    descriptor!("open_king_file", 0, 80, |p| p.open_king_file),
    descriptor!("open_adjacent_file", 0, 80, |p| p.open_adjacent_file),
];

/// Look a descriptor up by name.
pub fn find(name: &str) -> Option<&'static ParamDescriptor> {
    PARAMETERS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = PARAMETERS.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), PARAMETERS.len());
    }

    #[test]
    fn defaults_lie_within_bounds() {
        let params = EvalParams::default();
        for d in PARAMETERS {
            let v = (d.get)(&params);
            assert!(d.min <= v && v <= d.max, "{} = {v} outside {}..={}", d.name, d.min, d.max);
        }
    }

    #[test]
    fn setter_writes_through_to_the_field() {
        let mut params = EvalParams::default();
        let knight = find("knight_eg").expect("knight_eg is registered");
        (knight.set)(&mut params, 333);
        assert_eq!(params.material_eg[1], 333);
        assert_eq!((knight.get)(&params), 333);
    }

    #[test]
    fn set_clamped_respects_bounds() {
        let mut params = EvalParams::default();
        let corner = find("mop_up_corner").unwrap();
        assert_eq!(corner.set_clamped(&mut params, 1_000), 40);
        assert_eq!(params.mop_up_corner, 40);
        assert_eq!(corner.set_clamped(&mut params, -5), 0);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(find("king_mg").is_none());
    }
}
