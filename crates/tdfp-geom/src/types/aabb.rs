// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_math::{Fix, Vec2};

use crate::types::ray::{RayCastInput, RayCastOutput};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components; every
///   constructor orders its inputs to keep this true.
/// - Values are [`Fix`] metres in world space.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Constructs an AABB from two opposite corners, in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns the minimum corner.
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Returns the maximum corner.
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Builds an AABB centred at `center` with half-extents `half`.
    pub fn from_center_half_extents(center: Vec2, half: Vec2) -> Self {
        let half = half.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Builds the minimal AABB containing every point, or `None` when empty.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    pub fn overlaps(&self, other: &Self) -> bool {
        // Inclusive so touching boxes still pair up in the broad phase.
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    /// Returns `true` if `other` lies entirely inside `self` (inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Returns the union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Width times height.
    pub fn area(&self) -> Fix {
        let e = self.max - self.min;
        e.x * e.y
    }

    /// `2 * (width + height)`; the 2D surface-area heuristic.
    pub fn perimeter(&self) -> Fix {
        let e = self.max - self.min;
        (e.x + e.y) * 2
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * Fix::HALF
    }

    /// Half-extents.
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * Fix::HALF
    }

    /// Grows the box by `margin` on every side.
    pub fn expanded(&self, margin: Fix) -> Self {
        let r = Vec2::new(margin, margin);
        Self::new(self.min - r, self.max + r)
    }

    /// Moves the box by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Expands by `margin`, then stretches along `multiplier * displacement`
    /// so a moving proxy keeps fitting in its fat box for a few steps.
    pub fn fattened(&self, margin: Fix, displacement: Vec2, multiplier: Fix) -> Self {
        let mut out = self.expanded(margin);
        let d = displacement * multiplier;
        if d.x.is_negative() {
            out.min.x += d.x;
        } else {
            out.max.x += d.x;
        }
        if d.y.is_negative() {
            out.min.y += d.y;
        } else {
            out.max.y += d.y;
        }
        out
    }

    /// Slab test of the segment `p1 -> p1 + max_fraction * (p2 - p1)`.
    ///
    /// Returns the entry fraction and the face normal hit. A segment starting
    /// inside the box reports no hit.
    pub fn ray_cast(&self, input: &RayCastInput) -> Option<RayCastOutput> {
        let p = input.p1;
        let d = input.p2 - input.p1;
        let mut t_min = Fix::MIN;
        let mut t_max = Fix::MAX;
        let mut normal = Vec2::ZERO;

        let axes = [
            (p.x, d.x, self.min.x, self.max.x, Vec2::UNIT_X),
            (p.y, d.y, self.min.y, self.max.y, Vec2::UNIT_Y),
        ];
        for (origin, dir, lo, hi, axis) in axes {
            if dir.is_zero() {
                // Parallel: must already lie within this slab.
                if origin < lo || hi < origin {
                    return None;
                }
                continue;
            }
            let mut t1 = (lo - origin) / dir;
            let mut t2 = (hi - origin) / dir;
            let mut sign = Fix::NEG_ONE;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
                sign = Fix::ONE;
            }
            if t1 > t_min {
                normal = axis * sign;
                t_min = t1;
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_min.is_negative() || input.max_fraction < t_min {
            return None;
        }
        Some(RayCastOutput {
            normal,
            fraction: t_min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(Vec2::from_ints(-1, -1), Vec2::from_ints(1, 1))
    }

    #[test]
    fn new_orders_corners() {
        let b = Aabb::new(Vec2::from_ints(3, -2), Vec2::from_ints(-1, 4));
        assert_eq!(b.min(), Vec2::from_ints(-1, -2));
        assert_eq!(b.max(), Vec2::from_ints(3, 4));
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = unit();
        let b = a.translated(Vec2::from_ints(2, 0));
        let c = a.translated(Vec2::new(Fix::from_int(2) + Fix::EPSILON, Fix::ZERO));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn metrics() {
        let b = Aabb::new(Vec2::ZERO, Vec2::from_ints(2, 3));
        assert_eq!(b.area(), Fix::from_int(6));
        assert_eq!(b.perimeter(), Fix::from_int(10));
        assert_eq!(b.center(), Vec2::new(Fix::ONE, Fix::from_f64(1.5)));
        assert_eq!(b.extents(), Vec2::new(Fix::ONE, Fix::from_f64(1.5)));
    }

    #[test]
    fn fattened_extends_toward_motion_only() {
        let b = unit().fattened(Fix::HALF, Vec2::from_ints(-2, 1), Fix::ONE);
        assert_eq!(b.min(), Vec2::new(Fix::from_f64(-3.5), Fix::from_f64(-1.5)));
        assert_eq!(b.max(), Vec2::new(Fix::from_f64(1.5), Fix::from_f64(2.5)));
    }

    #[test]
    fn ray_hits_near_face() {
        let input = RayCastInput {
            p1: Vec2::from_ints(-3, 0),
            p2: Vec2::from_ints(3, 0),
            max_fraction: Fix::ONE,
        };
        let out = unit().ray_cast(&input);
        assert_eq!(
            out,
            Some(RayCastOutput {
                normal: -Vec2::UNIT_X,
                fraction: Fix::from_ratio(1, 3),
            })
        );
    }

    #[test]
    fn ray_misses_when_parallel_outside() {
        let input = RayCastInput {
            p1: Vec2::from_ints(-3, 2),
            p2: Vec2::from_ints(3, 2),
            max_fraction: Fix::ONE,
        };
        assert_eq!(unit().ray_cast(&input), None);
    }
}
