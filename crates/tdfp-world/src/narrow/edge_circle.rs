// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_geom::Transform2;
use tdfp_math::Fix;

use super::ContactManifold;
use crate::shape::{Circle, EdgeChain};

/// Edge chain A against circle B.
///
/// Each segment `v1 + t (v2 - v1)` is intersected with the circle. The
/// quadratic is divided through by `|v2 - v1|^2` first so no term grows with
/// the square of the segment length. The first segment with a root in
/// `[0, 1]` produces the contact.
pub(super) fn collide(
    edge: &EdgeChain,
    xf_a: &Transform2,
    circle: &Circle,
    xf_b: &Transform2,
) -> Option<ContactManifold> {
    let radius = circle.radius();
    let center = xf_a.apply_inverse(xf_b.position);

    for (v1, v2, n) in edge.segments() {
        let d = v2 - v1;
        let k = d.length_squared();
        if k.is_zero() {
            continue;
        }
        let f = v1 - center;
        let half_b = f.dot(d) / k;
        let c = (f.length_squared() - radius * radius) / k;
        let discriminant = half_b * half_b - c;
        if !discriminant.is_positive() {
            continue;
        }
        let root = discriminant.sqrt();
        let in_unit = |t: Fix| !t.is_negative() && t <= Fix::ONE;
        let t = match (-half_b - root, -half_b + root) {
            (t1, _) if in_unit(t1) => t1,
            (_, t2) if in_unit(t2) => t2,
            _ => continue,
        };
        let distance = n.dot(center - v1);
        return Some(ContactManifold::single(
            xf_a.rotate(n),
            radius - distance,
            xf_a.apply(v1 + d * t),
        ));
    }
    None
}
