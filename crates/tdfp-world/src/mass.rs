// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tdfp_math::{Fix, Vec2};

use crate::shape::Shape;

/// Mass and rotational inertia about the body origin.
///
/// Zero (or negative) mass means infinite mass: the body is static and its
/// inverse mass is zero. The same rule applies to inertia independently, so a
/// body may translate but never rotate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassProps {
    /// Mass.
    pub mass: Fix,
    /// Polar moment of inertia.
    pub inertia: Fix,
}

impl MassProps {
    /// Infinite mass and inertia.
    pub const STATIC: Self = Self {
        mass: Fix::ZERO,
        inertia: Fix::ZERO,
    };

    /// Explicit values.
    pub const fn new(mass: Fix, inertia: Fix) -> Self {
        Self { mass, inertia }
    }

    /// Derives mass from the shape's area at `density`.
    ///
    /// Edge chains have no area and come out static.
    pub fn from_shape(shape: &Shape, density: Fix) -> Self {
        match shape {
            Shape::Circle(c) => {
                let r2 = c.radius() * c.radius();
                let mass = density * Fix::PI * r2;
                Self::new(mass, mass * r2 / 2)
            }
            Shape::Polygon(p) => {
                let (area, inertia) = polygon_area_inertia(p.vertices());
                Self::new(density * area, density * inertia)
            }
            Shape::Edge(_) => Self::STATIC,
        }
    }

    /// `(1 / mass, 1 / inertia)`, with zero standing in for infinity.
    pub fn inverse(&self) -> (Fix, Fix) {
        (invert(self.mass), invert(self.inertia))
    }

    /// `true` when the mass is infinite.
    pub fn is_static(&self) -> bool {
        !self.mass.is_positive()
    }
}

fn invert(value: Fix) -> Fix {
    if value.is_positive() {
        Fix::ONE / value
    } else {
        Fix::ZERO
    }
}

// Triangle fan from the body origin: area and second moment per triangle.
fn polygon_area_inertia(vertices: &[Vec2]) -> (Fix, Fix) {
    let n = vertices.len();
    let mut area = Fix::ZERO;
    let mut inertia = Fix::ZERO;
    for i in 0..n {
        let e1 = vertices[i];
        let e2 = vertices[(i + 1) % n];
        let d = e1.cross(e2);
        area += d / 2;
        let int_x2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
        let int_y2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
        inertia += d / 12 * (int_x2 + int_y2);
    }
    (area, inertia)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::shape::{Circle, EdgeChain, Polygon};

    #[test]
    fn box_mass_matches_closed_form() {
        let shape = Shape::Polygon(Polygon::rect(Fix::ONE, Fix::ONE).expect("rect"));
        let props = MassProps::from_shape(&shape, Fix::ONE);
        assert_eq!(props.mass, Fix::from_int(4));
        // m (w^2 + h^2) / 12 = 4 * 8 / 12
        assert!((props.inertia - Fix::from_ratio(8, 3)).abs() <= Fix::from_raw(8));
    }

    #[test]
    fn circle_mass_uses_disc_inertia() {
        let shape = Shape::Circle(Circle::new(Fix::TWO).expect("circle"));
        let props = MassProps::from_shape(&shape, Fix::ONE);
        assert!((props.mass.to_f64() - 4.0 * core::f64::consts::PI).abs() < 1e-3);
        assert!((props.inertia.to_f64() - 8.0 * core::f64::consts::PI).abs() < 1e-2);
    }

    #[test]
    fn edges_and_zero_mass_are_static() {
        let edge = EdgeChain::new(&[Vec2::from_ints(-5, 0), Vec2::from_ints(5, 0)]).expect("edge");
        let props = MassProps::from_shape(&Shape::Edge(edge), Fix::ONE);
        assert!(props.is_static());
        assert_eq!(props.inverse(), (Fix::ZERO, Fix::ZERO));
        assert_eq!(
            MassProps::new(Fix::TWO, Fix::ZERO).inverse(),
            (Fix::HALF, Fix::ZERO)
        );
    }
}
