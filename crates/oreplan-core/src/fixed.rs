use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for coverage radii and link reach so every geometric decision is
/// bit-identical across platforms.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for initialization.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Half a tile: the offset from a tile's corner to its centre.
pub const HALF_TILE: Fixed64 = Fixed64::from_bits(1 << 31);

/// Whether two tile centres `(dx, dy)` tiles apart are within `reach`
/// (Euclidean). Compares squared distances so no square root is taken.
#[inline]
pub fn within_reach(dx: i32, dy: i32, reach: Fixed64) -> bool {
    let dist_sq = i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy);
    match reach.checked_mul(reach) {
        Some(reach_sq) => Fixed64::checked_from_num(dist_sq).is_some_and(|d| d <= reach_sq),
        None => true,
    }
}

/// The largest whole number of tiles along a straight line that still lies
/// within `reach`.
#[inline]
pub fn whole_tiles(reach: Fixed64) -> i32 {
    reach.floor().to_num::<i32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_tile_is_one_half() {
        assert_eq!(fixed64_to_f64(HALF_TILE), 0.5);
    }

    #[test]
    fn within_reach_uses_euclidean_distance() {
        let reach = f64_to_fixed64(7.5);
        assert!(within_reach(7, 0, reach));
        assert!(!within_reach(8, 0, reach));
        // 6^2 + 4^2 = 52 <= 56.25
        assert!(within_reach(6, 4, reach));
        // 6^2 + 5^2 = 61 > 56.25
        assert!(!within_reach(6, 5, reach));
    }

    #[test]
    fn whole_tiles_floors_reach() {
        assert_eq!(whole_tiles(f64_to_fixed64(7.5)), 7);
        assert_eq!(whole_tiles(f64_to_fixed64(9.0)), 9);
    }
}
