// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::{Fix, Vec3};

/// Deterministic 2D vector of [`Fix`] components.
///
/// * Components are world-space metres; the same type represents points and
///   directions.
/// * All arithmetic saturates like [`Fix`].
/// * [`Vec2::normalize`] of the zero vector is the zero vector.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// X component.
    pub x: Fix,
    /// Y component.
    pub y: Fix,
}

impl Vec2 {
    /// `(0, 0)`.
    pub const ZERO: Self = Self::new(Fix::ZERO, Fix::ZERO);
    /// `(1, 0)`.
    pub const UNIT_X: Self = Self::new(Fix::ONE, Fix::ZERO);
    /// `(0, 1)`.
    pub const UNIT_Y: Self = Self::new(Fix::ZERO, Fix::ONE);

    /// Creates a vector from components.
    pub const fn new(x: Fix, y: Fix) -> Self {
        Self { x, y }
    }

    /// Creates a vector from integer components.
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fix::from_int(x), Fix::from_int(y))
    }

    /// Converts from `f64` components at a host boundary.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(Fix::from_f64(x), Fix::from_f64(y))
    }

    /// Returns `(x, y)` as `f32` for rendering.
    pub fn to_f32(self) -> [f32; 2] {
        [self.x.to_f32(), self.y.to_f32()]
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fix {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product `self.x * other.y - self.y * other.x`.
    pub fn cross(self, other: Self) -> Fix {
        self.x * other.y - self.y * other.x
    }

    /// Cross of a scalar with a vector: `s × v = (-s * v.y, s * v.x)`.
    pub fn cross_sv(s: Fix, v: Self) -> Self {
        Self::new(-(s * v.y), s * v.x)
    }

    /// Cross of a vector with a scalar: `v × s = (s * v.y, -s * v.x)`.
    pub fn cross_vs(v: Self, s: Fix) -> Self {
        Self::new(s * v.y, -(s * v.x))
    }

    /// Counter-clockwise perpendicular `(-y, x)`.
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Squared magnitude.
    pub fn length_squared(self) -> Fix {
        self.dot(self)
    }

    /// Magnitude, computed as an exact integer hypotenuse of the raw
    /// components so short vectors keep full precision.
    pub fn length(self) -> Fix {
        let x = u64::from(self.x.raw().unsigned_abs());
        let y = u64::from(self.y.raw().unsigned_abs());
        let sum = x * x + y * y;
        Fix::from_raw(i32::try_from(sum.isqrt()).unwrap_or(i32::MAX))
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> Fix {
        (self - other).length()
    }

    /// Squared distance between two points.
    pub fn distance_squared(self, other: Self) -> Fix {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalize(self) -> Self {
        self.normalize_or(Self::ZERO)
    }

    /// Unit vector in the same direction, or `fallback` for the zero vector.
    pub fn normalize_or(self, fallback: Self) -> Self {
        let len = self.length();
        if len.is_zero() {
            return fallback;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Lifts into 3D with the given `z`.
    pub const fn extend(self, z: Fix) -> Vec3 {
        Vec3::new(self.x, self.y, z)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<Fix> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: Fix) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for Fix {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<Fix> for Vec2 {
    type Output = Self;
    fn div(self, rhs: Fix) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<Fix> for Vec2 {
    fn mul_assign(&mut self, rhs: Fix) {
        *self = *self * rhs;
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({}, {})", self.x, self.y)
    }
}
