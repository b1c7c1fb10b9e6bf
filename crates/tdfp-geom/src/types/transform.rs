// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_math::{Fix, Mat22, Vec2};

/// Rigid 2D transform: rotation followed by translation.
///
/// Points are mapped as `rotation * p + position`. There is no scale; shapes
/// carry their own dimensions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Transform2 {
    /// World-space translation.
    pub position: Vec2,
    /// World-space rotation.
    pub rotation: Mat22,
}

impl Transform2 {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: Mat22::IDENTITY,
    };

    /// Creates a transform from a translation and rotation matrix.
    pub const fn new(position: Vec2, rotation: Mat22) -> Self {
        Self { position, rotation }
    }

    /// Creates a transform from a translation and an angle in radians.
    pub fn from_angle(position: Vec2, angle: Fix) -> Self {
        Self::new(position, Mat22::from_angle(angle))
    }

    /// Local point to world.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.rotation.mul_vec(local) + self.position
    }

    /// World point to local.
    pub fn apply_inverse(&self, world: Vec2) -> Vec2 {
        self.rotation.mul_transpose_vec(world - self.position)
    }

    /// Local direction to world (no translation).
    pub fn rotate(&self, local: Vec2) -> Vec2 {
        self.rotation.mul_vec(local)
    }

    /// World direction to local (no translation).
    pub fn inverse_rotate(&self, world: Vec2) -> Vec2 {
        self.rotation.mul_transpose_vec(world)
    }
}
