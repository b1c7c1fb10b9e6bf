// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Convex collision shapes in body-local coordinates.
//!
//! Shapes carry no pose; every world-space query takes the owning body's
//! [`Transform2`]. Polygons are stored counter-clockwise with unit outward
//! normals, so `normals[i]` belongs to the face `vertices[i] -> vertices[i + 1]`.

use tdfp_geom::{Aabb, RayCastInput, RayCastOutput, Transform2};
use tdfp_math::{Fix, Vec2};

use crate::error::ShapeError;

/// Largest vertex count accepted by [`Polygon::new`].
pub const MAX_POLYGON_VERTICES: usize = 64;

/// Discriminant used by the narrow-phase dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// [`Circle`].
    Circle,
    /// [`Polygon`].
    Polygon,
    /// [`EdgeChain`].
    Edge,
}

/// Solid disc centred on the body origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    radius: Fix,
}

impl Circle {
    /// Creates a circle; the radius must be positive.
    pub fn new(radius: Fix) -> Result<Self, ShapeError> {
        if radius.is_positive() {
            Ok(Self { radius })
        } else {
            Err(ShapeError::NonPositiveRadius)
        }
    }

    /// Radius.
    pub const fn radius(&self) -> Fix {
        self.radius
    }
}

/// Convex polygon with at most [`MAX_POLYGON_VERTICES`] vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Builds the convex hull of `points` by gift wrapping.
    ///
    /// Interior and duplicate points are dropped; collinear points on the
    /// hull keep only the farthest one.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(ShapeError::TooManyVertices {
                count: points.len(),
                max: MAX_POLYGON_VERTICES,
            });
        }
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices {
                count: points.len(),
                min: 3,
            });
        }
        let vertices = gift_wrap(points)?;
        let area2: Fix = (0..vertices.len())
            .map(|i| vertices[i].cross(vertices[(i + 1) % vertices.len()]))
            .sum();
        if !area2.is_positive() {
            return Err(ShapeError::DegenerateHull);
        }
        let normals = face_normals(&vertices, true);
        Ok(Self { vertices, normals })
    }

    /// Axis-aligned box with the given half extents, centred on the origin.
    pub fn rect(half_width: Fix, half_height: Fix) -> Result<Self, ShapeError> {
        if !half_width.is_positive() || !half_height.is_positive() {
            return Err(ShapeError::DegenerateHull);
        }
        let vertices = vec![
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ];
        let normals = vec![
            Vec2::new(Fix::ZERO, Fix::NEG_ONE),
            Vec2::UNIT_X,
            Vec2::UNIT_Y,
            Vec2::new(Fix::NEG_ONE, Fix::ZERO),
        ];
        Ok(Self { vertices, normals })
    }

    /// Hull vertices, counter-clockwise.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Unit outward face normals.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Number of vertices (and faces).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; a built polygon has at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex `i` and its successor, wrapping around.
    pub fn face(&self, i: usize) -> (Vec2, Vec2) {
        let n = self.vertices.len();
        (self.vertices[i % n], self.vertices[(i + 1) % n])
    }

    /// Vertex farthest along `dir`; the first one wins on ties.
    pub fn support(&self, dir: Vec2) -> Vec2 {
        let mut best = Vec2::ZERO;
        let mut best_projection = Fix::MIN;
        for &v in &self.vertices {
            let projection = v.dot(dir);
            if projection > best_projection {
                best = v;
                best_projection = projection;
            }
        }
        best
    }

    fn ray_cast_local(&self, p1: Vec2, p2: Vec2, max_fraction: Fix) -> Option<(Fix, Vec2)> {
        let d = p2 - p1;
        let mut lower = Fix::ZERO;
        let mut upper = max_fraction;
        let mut hit = None;
        for (&v, &n) in self.vertices.iter().zip(&self.normals) {
            let numerator = n.dot(v - p1);
            let denominator = n.dot(d);
            if denominator.is_zero() {
                if numerator.is_negative() {
                    return None;
                }
            } else if denominator.is_negative() && numerator < lower * denominator {
                lower = numerator / denominator;
                hit = Some(n);
            } else if denominator.is_positive() && numerator < upper * denominator {
                upper = numerator / denominator;
            }
            if upper < lower {
                return None;
            }
        }
        hit.map(|n| (lower, n))
    }
}

/// Open chain of one-sided segments, typically static terrain.
///
/// Segment normals point to the left of the travel direction, so a chain laid
/// out left to right faces up.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeChain {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl EdgeChain {
    /// Creates a chain through `points` in order.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() < 2 {
            return Err(ShapeError::TooFewVertices {
                count: points.len(),
                min: 2,
            });
        }
        if points.windows(2).any(|w| w[0] == w[1]) {
            return Err(ShapeError::DegenerateHull);
        }
        let vertices = points.to_vec();
        let normals = face_normals(&vertices, false);
        Ok(Self { vertices, normals })
    }

    /// Chain vertices in order.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Unit left normal of each segment; one fewer than the vertices.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Iterates `(start, end, normal)` for each segment.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2, Vec2)> + '_ {
        self.vertices
            .windows(2)
            .zip(&self.normals)
            .map(|(w, &n)| (w[0], w[1], n))
    }

    fn ray_cast_local(&self, p1: Vec2, p2: Vec2, max_fraction: Fix) -> Option<(Fix, Vec2)> {
        let d = p2 - p1;
        let mut best: Option<(Fix, Vec2)> = None;
        for (v1, v2, n) in self.segments() {
            let numerator = n.dot(v1 - p1);
            let denominator = n.dot(d);
            if denominator.is_zero() {
                continue;
            }
            let t = numerator / denominator;
            let limit = best.map_or(max_fraction, |(f, _)| f);
            if t.is_negative() || limit <= t {
                continue;
            }
            let q = p1 + d * t;
            let e = v2 - v1;
            let ee = e.length_squared();
            if ee.is_zero() {
                continue;
            }
            let s = (q - v1).dot(e) / ee;
            if s.is_negative() || Fix::ONE < s {
                continue;
            }
            let normal = if numerator.is_positive() { -n } else { n };
            best = Some((t, normal));
        }
        best
    }
}

/// Collision geometry attached to exactly one body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Disc.
    Circle(Circle),
    /// Convex polygon.
    Polygon(Polygon),
    /// One-sided segment chain.
    Edge(EdgeChain),
}

impl From<Circle> for Shape {
    fn from(value: Circle) -> Self {
        Self::Circle(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl From<EdgeChain> for Shape {
    fn from(value: EdgeChain) -> Self {
        Self::Edge(value)
    }
}

impl Shape {
    /// Tag used by the narrow-phase dispatch.
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle(_) => ShapeKind::Circle,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::Edge(_) => ShapeKind::Edge,
        }
    }

    /// Tight world-space bounds under `xf`.
    pub fn compute_aabb(&self, xf: &Transform2) -> Aabb {
        match self {
            Self::Circle(c) => {
                let r = c.radius;
                Aabb::from_center_half_extents(xf.position, Vec2::new(r, r))
            }
            Self::Polygon(p) => bounds_of(xf, &p.vertices),
            Self::Edge(e) => bounds_of(xf, &e.vertices),
        }
    }

    /// Casts `input` (world space) against the shape placed at `xf`.
    ///
    /// Returns the entry fraction and the world-space surface normal. A ray
    /// that starts inside a circle or polygon reports no hit.
    pub fn ray_cast(&self, xf: &Transform2, input: &RayCastInput) -> Option<RayCastOutput> {
        match self {
            Self::Circle(c) => ray_cast_circle(c.radius, xf.position, input),
            Self::Polygon(p) => {
                let p1 = xf.apply_inverse(input.p1);
                let p2 = xf.apply_inverse(input.p2);
                p.ray_cast_local(p1, p2, input.max_fraction)
                    .map(|(fraction, n)| RayCastOutput {
                        normal: xf.rotate(n),
                        fraction,
                    })
            }
            Self::Edge(e) => {
                let p1 = xf.apply_inverse(input.p1);
                let p2 = xf.apply_inverse(input.p2);
                e.ray_cast_local(p1, p2, input.max_fraction)
                    .map(|(fraction, n)| RayCastOutput {
                        normal: xf.rotate(n),
                        fraction,
                    })
            }
        }
    }
}

fn bounds_of(xf: &Transform2, local: &[Vec2]) -> Aabb {
    let world: Vec<Vec2> = local.iter().map(|&v| xf.apply(v)).collect();
    Aabb::from_points(&world).unwrap_or_else(|| Aabb::new(xf.position, xf.position))
}

// Works with the normalized direction so intermediate products stay near
// world scale instead of squaring it.
fn ray_cast_circle(radius: Fix, center: Vec2, input: &RayCastInput) -> Option<RayCastOutput> {
    let r = input.p2 - input.p1;
    let len = r.length();
    if len.is_zero() {
        return None;
    }
    let dir = r / len;
    let s = input.p1 - center;
    let b = s.length_squared() - radius * radius;
    let c = s.dot(dir);
    let sigma = c * c - b;
    if sigma.is_negative() {
        return None;
    }
    let distance = -(c + sigma.sqrt());
    if distance.is_negative() || len * input.max_fraction < distance {
        return None;
    }
    Some(RayCastOutput {
        normal: (s + dir * distance).normalize(),
        fraction: distance / len,
    })
}

fn face_normals(vertices: &[Vec2], closed: bool) -> Vec<Vec2> {
    let n = vertices.len();
    let faces = if closed { n } else { n - 1 };
    (0..faces)
        .map(|i| {
            let d = vertices[(i + 1) % n] - vertices[i];
            if closed {
                Vec2::new(d.y, -d.x).normalize()
            } else {
                d.perp().normalize()
            }
        })
        .collect()
}

// Starts at the rightmost point (lowest on ties) and repeatedly picks the
// point with every other point on its left.
fn gift_wrap(points: &[Vec2]) -> Result<Vec<Vec2>, ShapeError> {
    let mut start = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let best = points[start];
        if p.x > best.x || (p.x == best.x && p.y < best.y) {
            start = i;
        }
    }

    let mut hull: Vec<usize> = Vec::with_capacity(points.len());
    let mut current = start;
    loop {
        if hull.len() >= points.len() {
            return Err(ShapeError::DegenerateHull);
        }
        hull.push(current);
        let origin = points[current];
        let mut next = 0;
        for i in 1..points.len() {
            if next == current {
                next = i;
                continue;
            }
            let e1 = points[next] - origin;
            let e2 = points[i] - origin;
            let c = e1.cross(e2);
            if c.is_negative() || (c.is_zero() && e2.length_squared() > e1.length_squared()) {
                next = i;
            }
        }
        current = next;
        if current == start {
            break;
        }
    }

    if hull.len() < 3 {
        return Err(ShapeError::DegenerateHull);
    }
    Ok(hull.into_iter().map(|i| points[i]).collect())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn hull_drops_interior_points_and_winds_ccw() {
        let points = [
            Vec2::from_ints(0, 0),
            Vec2::from_ints(2, 2),
            Vec2::from_ints(1, 1),
            Vec2::from_ints(2, 0),
            Vec2::from_ints(0, 2),
        ];
        let poly = Polygon::new(&points).expect("valid hull");
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.vertices()[0], Vec2::from_ints(2, 0));
        for i in 0..poly.len() {
            let (a, b) = poly.face(i);
            let (_, c) = poly.face(i + 1);
            assert!((b - a).cross(c - b).is_positive());
        }
    }

    #[test]
    fn collinear_input_is_degenerate() {
        let points = [
            Vec2::from_ints(0, 0),
            Vec2::from_ints(1, 0),
            Vec2::from_ints(2, 0),
        ];
        assert_eq!(Polygon::new(&points), Err(ShapeError::DegenerateHull));
    }

    #[test]
    fn gift_wrap_of_coincident_points_terminates() {
        let points = [Vec2::from_ints(1, 1); 4];
        assert_eq!(Polygon::new(&points), Err(ShapeError::DegenerateHull));
    }
}
