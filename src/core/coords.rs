//! Cell + Offset Coordinates
//!
//! World positions arrive as a coarse cell index plus a float offset inside
//! the cell. Converting back uses the same fixed cell size everywhere
//! (hero samples, wards).
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  position = (cell × 128 + offset) / 128     │
//! │                                             │
//! │  cell=4, offset=64.0  →  4.5                │
//! └─────────────────────────────────────────────┘
//! ```

/// Size of one world cell in offset units.
pub const CELL_SIZE: f32 = 128.0;

/// Decode a cell + offset pair into a world coordinate.
///
/// Either half missing yields `None`.
#[inline]
pub fn precise_location(cell: Option<i32>, offset: Option<f32>) -> Option<f32> {
    let (cell, offset) = (cell?, offset?);
    Some((cell as f32 * CELL_SIZE + offset) / CELL_SIZE)
}

/// Round half up to the nearest integer, saturating at the `i32` bounds.
///
/// NaN rounds to 0.
#[inline]
pub fn round_half_up(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Convert a tick count to whole seconds.
#[inline]
pub fn ticks_to_seconds(ticks: i32, ticks_per_second: i32) -> i32 {
    round_half_up(ticks as f32 / ticks_per_second as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_precise_location() {
        assert_eq!(precise_location(Some(4), Some(64.0)), Some(4.5));
        assert_eq!(precise_location(Some(0), Some(0.0)), Some(0.0));
        assert_eq!(precise_location(None, Some(64.0)), None);
        assert_eq!(precise_location(Some(4), None), None);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(f32::NAN), 0);
    }

    #[test]
    fn test_ticks_to_seconds() {
        assert_eq!(ticks_to_seconds(300, 30), 10);
        assert_eq!(ticks_to_seconds(44, 30), 1);
        assert_eq!(ticks_to_seconds(45, 30), 2);
        assert_eq!(ticks_to_seconds(0, 30), 0);
    }

    proptest! {
        #[test]
        fn test_location_stays_inside_cell(cell in 0i32..256, offset in 0.0f32..128.0) {
            let pos = precise_location(Some(cell), Some(offset)).unwrap();
            prop_assert!(pos >= cell as f32);
            prop_assert!(pos <= (cell + 1) as f32);
        }
    }
}
