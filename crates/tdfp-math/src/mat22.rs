// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::Mul;

use crate::{Fix, Vec2};

/// Column-major 2×2 matrix, used as a rotation.
///
/// Rotations built by [`Mat22::from_angle`] are orthonormal up to trig
/// rounding, so [`Mat22::transpose`] is their inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat22 {
    /// First column: the rotated X axis.
    pub col1: Vec2,
    /// Second column: the rotated Y axis.
    pub col2: Vec2,
}

impl Default for Mat22 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat22 {
    /// Identity rotation.
    pub const IDENTITY: Self = Self::from_cols(Vec2::UNIT_X, Vec2::UNIT_Y);

    /// Builds a matrix from its columns.
    pub const fn from_cols(col1: Vec2, col2: Vec2) -> Self {
        Self { col1, col2 }
    }

    /// Rotation by `angle` radians (counter-clockwise).
    pub fn from_angle(angle: Fix) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(Vec2::new(c, s), Vec2::new(-s, c))
    }

    /// Recovers the rotation angle in `[-π, π]`.
    pub fn angle(&self) -> Fix {
        self.col1.y.atan2(self.col1.x)
    }

    /// Rotated X axis.
    pub const fn axis_x(&self) -> Vec2 {
        self.col1
    }

    /// Rotated Y axis.
    pub const fn axis_y(&self) -> Vec2 {
        self.col2
    }

    /// Transpose; the inverse of a rotation.
    pub const fn transpose(&self) -> Self {
        Self::from_cols(
            Vec2::new(self.col1.x, self.col2.x),
            Vec2::new(self.col1.y, self.col2.y),
        )
    }

    /// Component-wise absolute value.
    pub fn abs(&self) -> Self {
        Self::from_cols(self.col1.abs(), self.col2.abs())
    }

    /// `self * v`.
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.col1.x * v.x + self.col2.x * v.y,
            self.col1.y * v.x + self.col2.y * v.y,
        )
    }

    /// `transpose(self) * v`: rotates a world vector into the local frame.
    pub fn mul_transpose_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.dot(self.col1), v.dot(self.col2))
    }

    /// `self * other`.
    pub fn mul_mat(&self, other: &Self) -> Self {
        Self::from_cols(self.mul_vec(other.col1), self.mul_vec(other.col2))
    }
}

impl Mul<Vec2> for Mat22 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        self.mul_vec(rhs)
    }
}

impl Mul for Mat22 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}
