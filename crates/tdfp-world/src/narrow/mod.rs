// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow phase: exact shape-pair tests producing contact manifolds.
//!
//! Conventions shared by every routine:
//! - the manifold normal points from body A to body B;
//! - penetration is positive when the shapes overlap;
//! - contact points are in world space;
//! - mirrored pairs call the canonical routine with the arguments swapped and
//!   negate the normal, so both orders agree bit for bit.

use tdfp_geom::Transform2;
use tdfp_math::{Fix, Vec2};

use crate::config::WorldConfig;
use crate::shape::Shape;

mod circle_circle;
mod circle_polygon;
mod edge_circle;
mod polygon_polygon;

/// Contact geometry for one overlapping pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContactManifold {
    /// Unit normal from A to B.
    pub normal: Vec2,
    /// Overlap depth along the normal.
    pub penetration: Fix,
    points: [Vec2; 2],
    count: usize,
}

impl ContactManifold {
    /// Manifold with one contact point.
    pub const fn single(normal: Vec2, penetration: Fix, point: Vec2) -> Self {
        Self {
            normal,
            penetration,
            points: [point, Vec2::ZERO],
            count: 1,
        }
    }

    pub(crate) const fn from_points(
        normal: Vec2,
        penetration: Fix,
        points: [Vec2; 2],
        count: usize,
    ) -> Self {
        Self {
            normal,
            penetration,
            points,
            count,
        }
    }

    /// World-space contact points (one or two).
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.count]
    }

    /// Number of contact points.
    pub const fn contact_count(&self) -> usize {
        self.count
    }

    /// The same contact seen from the other body.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Reference-face preference for polygon pairs.
///
/// Polygon A keeps the reference face unless B's axis is clearly better,
/// which stops the choice from flickering between nearly equal axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReferenceBias {
    /// Multiplier on B's penetration.
    pub relative: Fix,
    /// Multiplier on A's penetration added to the threshold.
    pub absolute: Fix,
}

impl ReferenceBias {
    /// `true` when `a` should win over `b`.
    pub fn prefers(&self, a: Fix, b: Fix) -> bool {
        a >= b * self.relative + a * self.absolute
    }
}

impl From<&WorldConfig> for ReferenceBias {
    fn from(config: &WorldConfig) -> Self {
        Self {
            relative: config.bias_relative,
            absolute: config.bias_absolute,
        }
    }
}

/// Tests `a` at `xf_a` against `b` at `xf_b`.
///
/// Pairs without a routine (polygon or edge against edge) never touch.
pub fn collide(
    a: &Shape,
    xf_a: &Transform2,
    b: &Shape,
    xf_b: &Transform2,
    bias: ReferenceBias,
) -> Option<ContactManifold> {
    match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => circle_circle::collide(ca, xf_a, cb, xf_b),
        (Shape::Circle(c), Shape::Polygon(p)) => circle_polygon::collide(c, xf_a, p, xf_b),
        (Shape::Polygon(p), Shape::Circle(c)) => {
            circle_polygon::collide(c, xf_b, p, xf_a).map(ContactManifold::flipped)
        }
        (Shape::Polygon(pa), Shape::Polygon(pb)) => {
            polygon_polygon::collide(pa, xf_a, pb, xf_b, bias)
        }
        (Shape::Edge(e), Shape::Circle(c)) => edge_circle::collide(e, xf_a, c, xf_b),
        (Shape::Circle(c), Shape::Edge(e)) => {
            edge_circle::collide(e, xf_b, c, xf_a).map(ContactManifold::flipped)
        }
        (Shape::Polygon(_) | Shape::Edge(_), Shape::Edge(_)) | (Shape::Edge(_), Shape::Polygon(_)) => {
            None
        }
    }
}
