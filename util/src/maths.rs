//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise an angle into the range `(-pi, pi]`.
///
/// Angles commanded to the actuators must lie within the expected wrap
/// range, so this is applied per-component to any outgoing joint vector.
///
/// The function is idempotent (`normalize_angle(normalize_angle(x)) ==
/// normalize_angle(x)`) and invariant under whole turns
/// (`normalize_angle(x + 2*k*pi) == normalize_angle(x)`).
pub fn normalize_angle<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    // Wrap into [0, 2pi), then shift the upper half turn down so that the
    // result lands in (-pi, pi]. Note -pi maps to +pi.
    let wrapped = rem_euclid(angle, tau_t);

    if wrapped > pi_t {
        wrapped - tau_t
    } else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_normalize_angle_range() {
        // A spread of angles, including many whole turns away from zero
        let angles = [
            0f64, 1.0, -1.0, PI, -PI, 3.5, -3.5, 10.0 * TAU + 0.2,
            -10.0 * TAU - 0.2, 1e6, -1e6,
        ];

        for a in angles.iter() {
            let n = normalize_angle(*a);
            assert!(
                n > -PI && n <= PI,
                "normalize_angle({}) = {} is outside (-pi, pi]",
                a,
                n
            );
        }
    }

    #[test]
    fn test_normalize_angle_idempotent() {
        let angles = [0f64, 0.5, -0.5, PI, -PI, 100.0, -100.0];

        for a in angles.iter() {
            let once = normalize_angle(*a);
            let twice = normalize_angle(once);
            assert!((once - twice).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_angle_periodic() {
        for k in -3i32..=3 {
            let a = 0.7 + (k as f64) * TAU;
            assert!((normalize_angle(a) - 0.7).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_angle_half_turn() {
        // Both +pi and -pi shall map onto +pi, the closed end of the range
        assert!((normalize_angle(PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
    }
}
