// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sequential-impulse contact solver.
//!
//! A [`ContactConstraint`] is built fresh per touching pair each step and
//! discarded afterwards. Each solve pass applies a normal impulse followed by
//! a Coulomb-clamped friction impulse per contact point; positional
//! correction runs once at the end of the step.

use tdfp_math::{Fix, Vec2};

use crate::body::RigidBody;
use crate::narrow::ContactManifold;

/// Solver state for one touching pair.
#[derive(Debug, Clone)]
pub(crate) struct ContactConstraint {
    /// Slot of body A.
    pub a: usize,
    /// Slot of body B.
    pub b: usize,
    pub manifold: ContactManifold,
    restitution: Fix,
    static_friction: Fix,
    dynamic_friction: Fix,
}

impl ContactConstraint {
    pub fn new(
        a: usize,
        b: usize,
        manifold: ContactManifold,
        body_a: &RigidBody,
        body_b: &RigidBody,
    ) -> Self {
        let ma = body_a.material();
        let mb = body_b.material();
        let (static_friction, dynamic_friction) = ma.combine_friction(&mb);
        Self {
            a,
            b,
            manifold,
            restitution: ma.combine_restitution(&mb),
            static_friction,
            dynamic_friction,
        }
    }

    /// Suppresses restitution for resting contacts.
    ///
    /// Runs after the first half force integration, so a body held up by its
    /// support only carries about half a step of gravity here.
    pub fn initialize(&mut self, body_a: &RigidBody, body_b: &RigidBody, resting_threshold: Fix) {
        for &contact in self.manifold.points() {
            let ra = contact - body_a.position();
            let rb = contact - body_b.position();
            let rv = relative_velocity(body_a, body_b, ra, rb);
            if rv.length_squared() < resting_threshold {
                self.restitution = Fix::ZERO;
            }
        }
    }

    /// One solver pass over this pair.
    pub fn apply_impulse(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, min_friction: Fix) {
        if (body_a.inv_mass() + body_b.inv_mass()).is_zero() {
            body_a.linear_velocity = Vec2::ZERO;
            body_b.linear_velocity = Vec2::ZERO;
            return;
        }

        let normal = self.manifold.normal;
        let count = match self.manifold.contact_count() {
            2 => Fix::TWO,
            _ => Fix::ONE,
        };

        for &contact in self.manifold.points() {
            let ra = contact - body_a.position();
            let rb = contact - body_b.position();

            let rv = relative_velocity(body_a, body_b, ra, rb);
            let contact_vel = rv.dot(normal);
            // Separating: leave the rest of the manifold alone too.
            if contact_vel.is_positive() {
                return;
            }

            let ra_cn = ra.cross(normal);
            let rb_cn = rb.cross(normal);
            let inv_mass_sum = body_a.inv_mass()
                + body_b.inv_mass()
                + ra_cn * ra_cn * body_a.inv_inertia()
                + rb_cn * rb_cn * body_b.inv_inertia();

            let j = -(Fix::ONE + self.restitution) * contact_vel / inv_mass_sum / count;
            let impulse = normal * j;
            body_a.apply_impulse(-impulse, ra);
            body_b.apply_impulse(impulse, rb);

            let rv = relative_velocity(body_a, body_b, ra, rb);
            let tangent = (rv - normal * rv.dot(normal)).normalize();
            let jt = -rv.dot(tangent) / inv_mass_sum / count;
            if jt.abs() <= min_friction {
                continue;
            }
            let tangent_impulse = if jt.abs() < j * self.static_friction {
                tangent * jt
            } else {
                tangent * (-j * self.dynamic_friction)
            };
            body_a.apply_impulse(-tangent_impulse, ra);
            body_b.apply_impulse(tangent_impulse, rb);
        }
    }

    /// Pushes the bodies apart along the normal, returning each displacement.
    pub fn positional_correction(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        slop: Fix,
        factor: Fix,
    ) -> (Vec2, Vec2) {
        let inv_sum = body_a.inv_mass() + body_b.inv_mass();
        if inv_sum.is_zero() {
            return (Vec2::ZERO, Vec2::ZERO);
        }
        let excess = (self.manifold.penetration - slop).max(Fix::ZERO);
        let correction = self.manifold.normal * (excess / inv_sum * factor);
        let offset_a = -(correction * body_a.inv_mass());
        let offset_b = correction * body_b.inv_mass();
        body_a.position += offset_a;
        body_b.position += offset_b;
        (offset_a, offset_b)
    }
}

fn relative_velocity(a: &RigidBody, b: &RigidBody, ra: Vec2, rb: Vec2) -> Vec2 {
    b.linear_velocity() + Vec2::cross_sv(b.angular_velocity(), rb)
        - a.linear_velocity()
        - Vec2::cross_sv(a.angular_velocity(), ra)
}

/// Mutable access to two distinct elements.
pub(crate) fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        Some((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = items.split_at_mut(a);
        Some((&mut hi[0], &mut lo[b]))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn pair_mut_rejects_aliasing_and_out_of_range() {
        let mut items = [1, 2, 3];
        assert!(pair_mut(&mut items, 1, 1).is_none());
        assert!(pair_mut(&mut items, 0, 3).is_none());
        let (x, y) = pair_mut(&mut items, 2, 0).expect("distinct");
        core::mem::swap(x, y);
        assert_eq!(items, [3, 2, 1]);
    }
}
