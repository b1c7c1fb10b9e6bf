// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_geom::Transform2;
use tdfp_math::Fix;

use super::ContactManifold;
use crate::shape::{Circle, Polygon};

/// Circle A against polygon B.
///
/// Works in B's frame: the face of greatest separation decides whether the
/// centre is inside, and otherwise which Voronoi region (either end vertex
/// or the face interior) the centre falls in.
pub(super) fn collide(
    circle: &Circle,
    xf_a: &Transform2,
    polygon: &Polygon,
    xf_b: &Transform2,
) -> Option<ContactManifold> {
    let radius = circle.radius();
    let center = xf_b.apply_inverse(xf_a.position);

    let mut separation = Fix::MIN;
    let mut face = 0;
    for (i, (&v, &n)) in polygon.vertices().iter().zip(polygon.normals()).enumerate() {
        let s = n.dot(center - v);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let face_normal = polygon.normals()[face];
    let (v1, v2) = polygon.face(face);

    if !separation.is_positive() {
        let normal = -xf_b.rotate(face_normal);
        return Some(ContactManifold::single(
            normal,
            radius - separation,
            xf_a.position + normal * radius,
        ));
    }

    let dot1 = (center - v1).dot(v2 - v1);
    let dot2 = (center - v2).dot(v1 - v2);
    let vertex = if !dot1.is_positive() {
        Some(v1)
    } else if !dot2.is_positive() {
        Some(v2)
    } else {
        None
    };

    if let Some(v) = vertex {
        let offset = v - center;
        let distance = offset.length();
        if distance > radius {
            return None;
        }
        let normal = xf_b.rotate(offset).normalize();
        return Some(ContactManifold::single(
            normal,
            radius - distance,
            xf_b.apply(v),
        ));
    }

    if face_normal.dot(center - v1) > radius {
        return None;
    }
    let normal = -xf_b.rotate(face_normal);
    Some(ContactManifold::single(
        normal,
        radius - separation,
        xf_a.position + normal * radius,
    ))
}
