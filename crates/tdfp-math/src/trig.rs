// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integer-only trigonometry on raw Q16.16 values.
//!
//! Both kernels evaluate a Horner polynomial in a Q4.28 working precision and
//! round back to Q16.16 once, so results are pure functions of the input bits.
//!
//! - `sin_cos_raw` reduces to `[0, π/2]`, evaluates a degree-11 Taylor series,
//!   then maps the quadrant. Absolute error stays under 2 raw units.
//! - `atan2_raw` reduces by octant (swap axes, then `tan(π/8)` argument
//!   reduction) and evaluates a degree-13 arctangent series. Absolute error
//!   stays under 1 raw unit.

pub(crate) const PI_RAW: i32 = 205_887;
pub(crate) const TAU_RAW: i32 = 411_775;
pub(crate) const FRAC_PI_2_RAW: i32 = 102_944;
pub(crate) const FRAC_PI_4_RAW: i32 = 51_472;
const THREE_FRAC_PI_2_RAW: i64 = 308_831;

const ONE_RAW: i64 = 1 << 16;

// Working precision: Q4.28 in i64.
const WORK_BITS: u32 = 28;
const WORK_ONE: i64 = 1 << WORK_BITS;
const WIDEN: u32 = WORK_BITS - 16;
const ROUND: i64 = 1 << (WIDEN - 1);

const TAN_FRAC_PI_8_W: i64 = 111_189_606;
const FRAC_PI_4_W: i64 = 210_828_714;
const FRAC_PI_2_W: i64 = 421_657_428;
const PI_W: i64 = 843_314_857;

/// Sine of a raw angle already reduced to `[0, π/2]`.
fn sin_quarter(angle: i64) -> i64 {
    let t = angle << WIDEN;
    let t2 = (t * t) >> WORK_BITS;
    let mut acc = WORK_ONE;
    // x - x^3/3! + ... - x^11/11!, nested as x(1 - x^2/6(1 - x^2/20(...)))
    for denom in [110_i64, 72, 42, 20, 6] {
        acc = WORK_ONE - ((t2 * acc) >> WORK_BITS) / denom;
    }
    let res = (t * acc) >> WORK_BITS;
    ((res + ROUND) >> WIDEN).clamp(0, ONE_RAW)
}

/// Reduces `angle` into `[-PI_RAW, PI_RAW]`; `TAU_RAW` is odd so both ends fit.
pub(crate) fn wrap_angle_raw(angle: i32) -> i32 {
    let pi = i64::from(PI_RAW);
    let wrapped = (i64::from(angle) + pi).rem_euclid(i64::from(TAU_RAW)) - pi;
    i32::try_from(wrapped).unwrap_or(0)
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn sin_cos_raw(angle: i32) -> (i32, i32) {
    let wide = i64::from(angle);
    let reduced = wide.abs() % i64::from(TAU_RAW);
    let half = i64::from(FRAC_PI_2_RAW);
    let pi = i64::from(PI_RAW);
    let (quadrant, local) = if reduced < half {
        (0, reduced)
    } else if reduced < pi {
        (1, reduced - half)
    } else if reduced < THREE_FRAC_PI_2_RAW {
        (2, reduced - pi)
    } else {
        (3, reduced - THREE_FRAC_PI_2_RAW)
    };
    let s = sin_quarter(local);
    let c = sin_quarter((half - local).max(0));
    let (s, c) = match quadrant {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };
    let s = if wide < 0 { -s } else { s };
    // Both components are clamped to [-ONE, ONE].
    (s as i32, c as i32)
}

fn atan_series(u: i64) -> i64 {
    let u2 = (u * u) >> WORK_BITS;
    let mut acc = WORK_ONE / 13;
    for denom in [11_i64, 9, 7, 5, 3, 1] {
        acc = WORK_ONE / denom - ((u2 * acc) >> WORK_BITS);
    }
    (u * acc) >> WORK_BITS
}

/// Arctangent of a Q4.28 ratio in `[0, 1]`.
fn atan_unit(t: i64) -> i64 {
    if t > TAN_FRAC_PI_8_W {
        // atan(t) = π/4 + atan((t - 1) / (1 + t))
        let u = ((t - WORK_ONE) << WORK_BITS) / (WORK_ONE + t);
        FRAC_PI_4_W + atan_series(u)
    } else {
        atan_series(t)
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn atan2_raw(y: i32, x: i32) -> i32 {
    if x == 0 && y == 0 {
        return 0;
    }
    let ax = i64::from(x).abs();
    let ay = i64::from(y).abs();
    let mut angle = if ay <= ax {
        atan_unit((ay << WORK_BITS) / ax)
    } else {
        FRAC_PI_2_W - atan_unit((ax << WORK_BITS) / ay)
    };
    if x < 0 {
        angle = PI_W - angle;
    }
    if y < 0 {
        angle = -angle;
    }
    let rounded = if angle >= 0 {
        angle + ROUND
    } else {
        angle - ROUND
    };
    // |angle| <= π, well inside i32 after narrowing.
    (rounded / (1 << WIDEN)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_sine_hits_endpoints() {
        assert_eq!(sin_quarter(0), 0);
        assert_eq!(sin_quarter(i64::from(FRAC_PI_2_RAW)), ONE_RAW);
    }

    #[test]
    fn cardinal_angles() {
        assert_eq!(sin_cos_raw(0), (0, 65_536));
        assert_eq!(sin_cos_raw(FRAC_PI_2_RAW), (65_536, 0));
        assert_eq!(sin_cos_raw(PI_RAW), (0, -65_536));
        assert_eq!(sin_cos_raw(-FRAC_PI_2_RAW), (-65_536, 0));
    }

    #[test]
    fn wrap_keeps_the_half_turn_window() {
        assert_eq!(wrap_angle_raw(PI_RAW), PI_RAW);
        assert_eq!(wrap_angle_raw(-PI_RAW), -PI_RAW);
        assert_eq!(wrap_angle_raw(PI_RAW + 1), -PI_RAW);
        assert_eq!(wrap_angle_raw(TAU_RAW + 7), 7);
        for extreme in [i32::MIN, i32::MAX] {
            assert!((-PI_RAW..=PI_RAW).contains(&wrap_angle_raw(extreme)));
        }
    }

    #[test]
    fn atan2_cardinal_and_diagonal() {
        assert_eq!(atan2_raw(65_536, 65_536), FRAC_PI_4_RAW);
        assert_eq!(atan2_raw(0, -65_536), PI_RAW);
        assert_eq!(atan2_raw(65_536, 0), FRAC_PI_2_RAW);
        assert_eq!(atan2_raw(-65_536, 0), -FRAC_PI_2_RAW);
        assert_eq!(atan2_raw(0, 65_536), 0);
    }
}
