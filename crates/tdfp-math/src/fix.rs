// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Q16.16 fixed-point scalar.
//!
//! The representation is an `i32` storing an integer scaled by `2^16`:
//! `real_value = raw / 2^16`. Every operation works on the raw integer, so the
//! same inputs produce the same bits on every platform.
//!
//! Rounding policy:
//! - multiply: `(a * b + 2^15) >> 16` evaluated in 64-bit;
//! - divide: `((a << 17) / b + 1) >> 1` evaluated in 64-bit;
//! - all arithmetic saturates at [`Fix::MIN`]/[`Fix::MAX`] instead of wrapping;
//! - division by zero saturates by the sign of the dividend (`0 / 0 == 0`).

use core::cmp::Ordering;
use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::trig;

/// Number of fractional bits in the Q16.16 encoding.
pub const FRAC_BITS: u32 = 16;

const ONE_RAW: i32 = 1 << FRAC_BITS;
const FRAC_MASK: i32 = ONE_RAW - 1;
const HALF_RAW: i64 = 1 << (FRAC_BITS - 1);

/// Signed Q16.16 fixed-point number.
///
/// Equality and ordering are raw-integer comparisons.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Fix(i32);

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value.is_negative() {
        i32::MIN
    } else {
        i32::MAX
    })
}

impl Fix {
    /// `0`.
    pub const ZERO: Self = Self(0);
    /// `1`.
    pub const ONE: Self = Self(ONE_RAW);
    /// `2`.
    pub const TWO: Self = Self(2 * ONE_RAW);
    /// `0.5`.
    pub const HALF: Self = Self(ONE_RAW / 2);
    /// `-1`.
    pub const NEG_ONE: Self = Self(-ONE_RAW);
    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);
    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);
    /// Smallest positive value (one raw unit, `2^-16`).
    pub const EPSILON: Self = Self(1);
    /// π rounded to Q16.16.
    pub const PI: Self = Self(trig::PI_RAW);
    /// 2π rounded to Q16.16.
    pub const TAU: Self = Self(trig::TAU_RAW);
    /// π/2 rounded to Q16.16.
    pub const FRAC_PI_2: Self = Self(trig::FRAC_PI_2_RAW);
    /// π/4 rounded to Q16.16.
    pub const FRAC_PI_4: Self = Self(trig::FRAC_PI_4_RAW);

    /// Wraps a raw Q16.16 value.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw Q16.16 representation.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts an integer, saturating outside `[-32768, 32767]`.
    pub const fn from_int(value: i32) -> Self {
        Self(value.saturating_mul(ONE_RAW))
    }

    /// Builds `numerator / denominator` with the division rounding policy.
    pub fn from_ratio(numerator: i32, denominator: i32) -> Self {
        Self::from_int(numerator) / Self::from_int(denominator)
    }

    /// Converts an `f64` at a host boundary, rounding to nearest.
    ///
    /// `NaN` maps to zero; out-of-range values saturate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Self {
        // `as` saturates and maps NaN to 0.
        Self((value * f64::from(ONE_RAW)).round() as i32)
    }

    /// Converts an `f32` at a host boundary, rounding to nearest.
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }

    /// Converts to `f64` for diagnostics and rendering. Exact.
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(ONE_RAW)
    }

    /// Converts to `f32` for rendering.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Largest integer less than or equal to `self`.
    pub const fn floor_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// Smallest integer greater than or equal to `self`.
    pub fn ceil_int(self) -> i32 {
        self.floor_int() + i32::from(self.0 & FRAC_MASK != 0)
    }

    /// Absolute value, saturating `MIN` to `MAX`.
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// `-1`, `0` or `1` according to the sign.
    pub const fn signum(self) -> Self {
        Self(self.0.signum() * ONE_RAW)
    }

    /// `true` when strictly below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `true` when strictly above zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `true` when exactly zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Exact integer square root of the raw value. Negative inputs yield zero.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        let widened = u64::from(self.0.unsigned_abs()) << FRAC_BITS;
        Self(i32::try_from(widened.isqrt()).unwrap_or(i32::MAX))
    }

    /// Deterministic sine of `self` radians.
    pub fn sin(self) -> Self {
        self.sin_cos().0
    }

    /// Deterministic cosine of `self` radians.
    pub fn cos(self) -> Self {
        self.sin_cos().1
    }

    /// Deterministic sine and cosine sharing one range reduction.
    pub fn sin_cos(self) -> (Self, Self) {
        let (s, c) = trig::sin_cos_raw(self.0);
        (Self(s), Self(c))
    }

    /// The same angle reduced into `[-π, π]`.
    ///
    /// Repeatedly accumulated angles stay far from saturation this way.
    pub fn wrap_angle(self) -> Self {
        Self(trig::wrap_angle_raw(self.0))
    }

    /// Four-quadrant arctangent of `self / x` in `[-π, π]`.
    ///
    /// `atan2(0, 0)` is defined as zero.
    pub fn atan2(self, x: Self) -> Self {
        Self(trig::atan2_raw(self.0, x.0))
    }

    /// Linear interpolation `self + (other - self) * t`.
    pub fn lerp(self, other: Self, t: Self) -> Self {
        self + (other - self) * t
    }

    /// Multiplies then divides with a single rounding step: `self * mul / div`.
    pub fn mul_div(self, mul: Self, div: Self) -> Self {
        let num = i128::from(self.0) * i128::from(mul.0);
        if div.0 == 0 {
            return div_by_zero(num.cmp(&0));
        }
        let quotient = ((num << 1) / i128::from(div.0) + 1) >> 1;
        Self(i32::try_from(quotient).unwrap_or(if quotient < 0 {
            i32::MIN
        } else {
            i32::MAX
        }))
    }
}

fn div_by_zero(numerator_sign: Ordering) -> Fix {
    match numerator_sign {
        Ordering::Less => Fix::MIN,
        Ordering::Equal => Fix::ZERO,
        Ordering::Greater => Fix::MAX,
    }
}

impl Add for Fix {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fix {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Fix {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let product = i64::from(self.0) * i64::from(rhs.0);
        Self(saturate((product + HALF_RAW) >> FRAC_BITS))
    }
}

impl Mul<i32> for Fix {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Mul<Fix> for i32 {
    type Output = Fix;
    fn mul(self, rhs: Fix) -> Fix {
        rhs * self
    }
}

impl Div for Fix {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return div_by_zero(self.0.cmp(&0));
        }
        let num = i64::from(self.0) << (FRAC_BITS + 1);
        Self(saturate((num / i64::from(rhs.0) + 1) >> 1))
    }
}

impl Div<i32> for Fix {
    type Output = Self;
    fn div(self, rhs: i32) -> Self {
        self / Self::from_int(rhs)
    }
}

impl Neg for Fix {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl AddAssign for Fix {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fix {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fix {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fix {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for Fix {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i32> for Fix {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Debug for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fix({self})")
    }
}

/// Prints up to six decimal places, trailing zeros trimmed, computed from the
/// raw integer so output is identical on every platform.
impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = i64::from(self.0);
        let abs = raw.unsigned_abs();
        let whole = abs >> FRAC_BITS;
        let frac = abs & u64::from(FRAC_MASK.unsigned_abs());
        if raw < 0 {
            f.write_str("-")?;
        }
        write!(f, "{whole}")?;
        if frac == 0 {
            return Ok(());
        }
        let scaled = (frac * 1_000_000 + (1 << (FRAC_BITS - 1))) >> FRAC_BITS;
        let digits = format!("{scaled:06}");
        write!(f, ".{}", digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_clamps_both_directions() {
        assert_eq!(saturate(i64::from(i32::MAX) + 5), i32::MAX);
        assert_eq!(saturate(i64::from(i32::MIN) - 5), i32::MIN);
        assert_eq!(saturate(-7), -7);
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Fix::from_f64(1.5).to_string(), "1.5");
        assert_eq!(Fix::from_f64(-2.25).to_string(), "-2.25");
        assert_eq!(Fix::from_int(3).to_string(), "3");
        assert_eq!(Fix::ZERO.to_string(), "0");
    }
}
