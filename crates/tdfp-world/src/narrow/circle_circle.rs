// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_geom::Transform2;
use tdfp_math::Vec2;

use super::ContactManifold;
use crate::shape::Circle;

pub(super) fn collide(
    a: &Circle,
    xf_a: &Transform2,
    b: &Circle,
    xf_b: &Transform2,
) -> Option<ContactManifold> {
    let delta = xf_b.position - xf_a.position;
    let radii = a.radius() + b.radius();
    let distance = delta.length();
    if distance >= radii {
        return None;
    }
    if distance.is_zero() {
        // Concentric: any axis separates them equally well.
        return Some(ContactManifold::single(Vec2::UNIT_X, radii, xf_a.position));
    }
    let normal = delta / distance;
    Some(ContactManifold::single(
        normal,
        radii - distance,
        xf_a.position + normal * a.radius(),
    ))
}
