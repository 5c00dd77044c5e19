//! Maths helpers shared by the control loops

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the closed range `[min, max]`. `NaN` is passed through.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Clamp a value into the symmetric range `[-limit, limit]`.
pub fn clamp_abs<T>(value: T, limit: T) -> T
where
    T: Float
{
    clamp(value, -limit, limit)
}

/// Wrap an angle in degrees into the range (-180, 180].
///
/// Used to get the shortest signed angular distance from a raw difference of
/// two headings.
pub fn wrap_180_deg(value: f64) -> f64 {
    let wrapped = rem_euclid(value + 180.0, 360.0) - 180.0;

    // rem_euclid gives [-180, 180), flip the lower bound across
    if wrapped <= -180.0 {
        180.0
    }
    else {
        wrapped
    }
}

/// Least non-negative remainder of `lhs` modulo `rhs`, as `f64::rem_euclid`
/// for any [`Float`].
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}
