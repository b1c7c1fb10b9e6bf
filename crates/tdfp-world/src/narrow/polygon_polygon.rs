// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_geom::Transform2;
use tdfp_math::{Fix, Vec2};

use super::{ContactManifold, ReferenceBias};
use crate::shape::Polygon;

/// Polygon A against polygon B.
///
/// Separating-axis search over both face sets, then the incident face is
/// clipped against the side planes of the reference face. Contact points are
/// the clipped points lying behind the reference face; penetration is their
/// mean depth.
pub(super) fn collide(
    a: &Polygon,
    xf_a: &Transform2,
    b: &Polygon,
    xf_b: &Transform2,
    bias: ReferenceBias,
) -> Option<ContactManifold> {
    let (penetration_a, face_a) = axis_least_penetration(a, xf_a, b, xf_b);
    if !penetration_a.is_negative() {
        return None;
    }
    let (penetration_b, face_b) = axis_least_penetration(b, xf_b, a, xf_a);
    if !penetration_b.is_negative() {
        return None;
    }

    let (reference, ref_xf, incident, inc_xf, ref_index, flip) =
        if bias.prefers(penetration_a, penetration_b) {
            (a, xf_a, b, xf_b, face_a, false)
        } else {
            (b, xf_b, a, xf_a, face_b, true)
        };

    let incident_face = incident_face(reference, ref_xf, incident, inc_xf, ref_index);

    let (v1, v2) = reference.face(ref_index);
    let v1 = ref_xf.apply(v1);
    let v2 = ref_xf.apply(v2);
    let side = (v2 - v1).normalize();
    let ref_normal = Vec2::new(side.y, -side.x);
    let ref_offset = ref_normal.dot(v1);
    let neg_side = -side.dot(v1);
    let pos_side = side.dot(v2);

    let clipped = clip(-side, neg_side, incident_face)?;
    let clipped = clip(side, pos_side, clipped)?;

    let mut points = [Vec2::ZERO; 2];
    let mut count = 0;
    let mut depth = Fix::ZERO;
    for p in clipped {
        let separation = ref_normal.dot(p) - ref_offset;
        if !separation.is_positive() {
            points[count] = p;
            count += 1;
            depth -= separation;
        }
    }
    if count == 0 {
        return None;
    }
    let penetration = if count == 2 { depth / 2 } else { depth };
    let normal = if flip { -ref_normal } else { ref_normal };
    Some(ContactManifold::from_points(normal, penetration, points, count))
}

/// Greatest signed distance of B's support point below one of A's faces.
///
/// Negative means every face of A has some of B behind it.
fn axis_least_penetration(
    a: &Polygon,
    xf_a: &Transform2,
    b: &Polygon,
    xf_b: &Transform2,
) -> (Fix, usize) {
    let mut best = Fix::MIN;
    let mut best_index = 0;
    for (i, (&v, &n)) in a.vertices().iter().zip(a.normals()).enumerate() {
        let n_in_b = xf_b.inverse_rotate(xf_a.rotate(n));
        let support = b.support(-n_in_b);
        let v_in_b = xf_b.apply_inverse(xf_a.apply(v));
        let d = n_in_b.dot(support - v_in_b);
        if d > best {
            best = d;
            best_index = i;
        }
    }
    (best, best_index)
}

/// World-space face of `incident` most anti-parallel to the reference normal.
fn incident_face(
    reference: &Polygon,
    ref_xf: &Transform2,
    incident: &Polygon,
    inc_xf: &Transform2,
    ref_index: usize,
) -> [Vec2; 2] {
    let ref_normal = inc_xf.inverse_rotate(ref_xf.rotate(reference.normals()[ref_index]));
    let mut index = 0;
    let mut min_dot = Fix::MAX;
    for (i, &n) in incident.normals().iter().enumerate() {
        let d = ref_normal.dot(n);
        if d < min_dot {
            min_dot = d;
            index = i;
        }
    }
    let (v1, v2) = incident.face(index);
    [inc_xf.apply(v1), inc_xf.apply(v2)]
}

/// Keeps the part of `face` with `n . p <= c`.
///
/// Returns `None` when fewer than two points survive.
fn clip(n: Vec2, c: Fix, face: [Vec2; 2]) -> Option<[Vec2; 2]> {
    let d1 = n.dot(face[0]) - c;
    let d2 = n.dot(face[1]) - c;
    let mut out = [Vec2::ZERO; 2];
    let mut count = 0;
    if !d1.is_positive() {
        out[count] = face[0];
        count += 1;
    }
    if !d2.is_positive() {
        out[count] = face[1];
        count += 1;
    }
    let straddles = (d1.is_negative() && d2.is_positive()) || (d1.is_positive() && d2.is_negative());
    if straddles && count < 2 {
        let alpha = d1 / (d1 - d2);
        out[count] = face[0] + (face[1] - face[0]) * alpha;
        count += 1;
    }
    (count == 2).then_some(out)
}
