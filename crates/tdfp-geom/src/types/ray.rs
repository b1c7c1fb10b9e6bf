// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_math::{Fix, Vec2};

/// Segment cast from `p1` toward `p2`, limited to `max_fraction` of its length.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RayCastInput {
    /// Start point.
    pub p1: Vec2,
    /// End point at fraction `1`.
    pub p2: Vec2,
    /// Portion of `p1 -> p2` that is tested, usually `1`.
    pub max_fraction: Fix,
}

impl RayCastInput {
    /// Full-length cast from `p1` to `p2`.
    pub const fn new(p1: Vec2, p2: Vec2) -> Self {
        Self {
            p1,
            p2,
            max_fraction: Fix::ONE,
        }
    }

    /// Point at `fraction` along the segment.
    pub fn point_at(&self, fraction: Fix) -> Vec2 {
        self.p1 + (self.p2 - self.p1) * fraction
    }
}

/// Result of a successful ray cast against one volume or shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RayCastOutput {
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Fraction of `p1 -> p2` at which the hit occurs.
    pub fraction: Fix,
}
