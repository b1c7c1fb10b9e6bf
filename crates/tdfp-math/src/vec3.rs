// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::{Add, Mul, Neg, Sub};

use crate::{Fix, Vec2};

/// Deterministic 3D vector of [`Fix`] components.
///
/// Used at the render boundary, where a 2D pose is lifted into a host's 3D
/// scene (`z` carries layer depth).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    /// X component.
    pub x: Fix,
    /// Y component.
    pub y: Fix,
    /// Z component.
    pub z: Fix,
}

impl Vec3 {
    /// `(0, 0, 0)`.
    pub const ZERO: Self = Self::new(Fix::ZERO, Fix::ZERO, Fix::ZERO);

    /// Creates a vector from components.
    pub const fn new(x: Fix, y: Fix, z: Fix) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fix {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared magnitude.
    pub fn length_squared(self) -> Fix {
        self.dot(self)
    }

    /// Magnitude.
    pub fn length(self) -> Fix {
        let sum = [self.x, self.y, self.z]
            .iter()
            .map(|c| {
                let a = u64::from(c.raw().unsigned_abs());
                a * a
            })
            .fold(0_u64, u64::saturating_add);
        Fix::from_raw(i32::try_from(sum.isqrt()).unwrap_or(i32::MAX))
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Drops `z`.
    pub const fn truncate(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Returns the components as `f32` for rendering.
    pub fn to_f32(self) -> [f32; 3] {
        [self.x.to_f32(), self.y.to_f32(), self.z.to_f32()]
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Fix> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: Fix) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
