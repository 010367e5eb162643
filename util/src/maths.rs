//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. Due to floating point round-off it can result in
/// `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in magnitude and
/// `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_deg_360<T>(angle_deg: T) -> T
where
    T: Float
{
    // 360 is always representable
    let full_turn = T::from(360.0).unwrap_or_else(T::max_value);
    let wrapped = rem_euclid(angle_deg, full_turn);

    if wrapped >= full_turn { T::zero() } else { wrapped }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 20.0, 780.0), 20.0);
        assert_eq!(clamp(800.0, 20.0, 780.0), 780.0);
        assert_eq!(clamp(400.0, 20.0, 780.0), 400.0);
        assert_eq!(clamp(-60.0f32, -50.0, 50.0), -50.0);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(5.0, 2.0), 1.0);
        assert_eq!(rem_euclid(-1.0, 2.0), 1.0);
        assert_eq!(rem_euclid(-4.0, 2.0), 0.0);
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(270.0), 270.0);
        assert_eq!(wrap_deg_360(-90.0), 270.0);
        assert_eq!(wrap_deg_360(725.0), 5.0);
        assert_eq!(wrap_deg_360(360.0), 0.0);
    }
}
