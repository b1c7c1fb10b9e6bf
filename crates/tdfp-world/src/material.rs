// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_math::Fix;

/// Surface response coefficients of one body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Material {
    /// Coulomb coefficient below which contacts stick.
    pub static_friction: Fix,
    /// Coulomb coefficient applied once contacts slide.
    pub dynamic_friction: Fix,
    /// Bounciness in `[0, 1]`.
    pub restitution: Fix,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            static_friction: Fix::from_ratio(2, 5),
            dynamic_friction: Fix::from_ratio(1, 5),
            restitution: Fix::ZERO,
        }
    }
}

impl Material {
    /// Pair restitution: the smaller of the two.
    pub fn combine_restitution(&self, other: &Self) -> Fix {
        self.restitution.min(other.restitution)
    }

    /// Pair friction `(static, dynamic)`: root of the sum of squares.
    pub fn combine_friction(&self, other: &Self) -> (Fix, Fix) {
        let root = |a: Fix, b: Fix| (a * a + b * b).sqrt();
        (
            root(self.static_friction, other.static_friction),
            root(self.dynamic_friction, other.dynamic_friction),
        )
    }
}
