// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::panic)]
//! Contact generation for every supported shape pair.

use proptest::prelude::*;
use tdfp_geom::Transform2;
use tdfp_math::{Fix, Vec2};
use tdfp_world::{
    collide, Circle, ContactManifold, EdgeChain, Polygon, ReferenceBias, Shape, WorldConfig,
};

fn bias() -> ReferenceBias {
    ReferenceBias::from(&WorldConfig::default())
}

fn at(x: f64, y: f64) -> Transform2 {
    Transform2::new(Vec2::from_f64(x, y), Default::default())
}

fn circle(r: f64) -> Shape {
    Shape::Circle(Circle::new(Fix::from_f64(r)).expect("circle"))
}

fn rect(hw: f64, hh: f64) -> Shape {
    Shape::Polygon(Polygon::rect(Fix::from_f64(hw), Fix::from_f64(hh)).expect("rect"))
}

fn floor_edge() -> Shape {
    Shape::Edge(EdgeChain::new(&[Vec2::from_ints(-10, 0), Vec2::from_ints(10, 0)]).expect("edge"))
}

fn near(a: Fix, b: f64, tol: f64) -> bool {
    (a.to_f64() - b).abs() <= tol
}

#[test]
fn overlapping_circles_report_half_unit_penetration() {
    let m = collide(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(1.5, 0.0), bias())
        .expect("overlap");
    assert_eq!(m.penetration, Fix::HALF);
    assert_eq!(m.normal, Vec2::UNIT_X);
    assert_eq!(m.points(), &[Vec2::UNIT_X]);
}

#[test]
fn separated_and_touching_circles_do_not_collide() {
    assert!(collide(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(3.0, 0.0), bias()).is_none());
    assert!(collide(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(2.0, 0.0), bias()).is_none());
}

#[test]
fn large_circles_overlap_beyond_the_squared_range() {
    // Both centre distance and radius sum square past Fix::MAX.
    let m = collide(&circle(100.0), &at(0.0, 0.0), &circle(100.0), &at(190.0, 0.0), bias())
        .expect("overlap");
    assert_eq!(m.penetration, Fix::from_int(10));
    assert_eq!(m.normal, Vec2::UNIT_X);
    assert_eq!(m.points(), &[Vec2::from_ints(100, 0)]);
    assert!(collide(&circle(100.0), &at(0.0, 0.0), &circle(100.0), &at(210.0, 0.0), bias()).is_none());
}

#[test]
fn large_circle_reaches_box_corner() {
    // Corner offset is (-60, -80): length 100 against radius 101.
    let m = collide(&circle(101.0), &at(61.0, 81.0), &rect(1.0, 1.0), &at(0.0, 0.0), bias())
        .expect("corner contact");
    assert_eq!(m.penetration, Fix::ONE);
    assert_eq!(m.points(), &[Vec2::from_ints(1, 1)]);
    assert!(near(m.normal.x, -0.6, 1e-3), "{}", m.normal.x);
    assert!(near(m.normal.y, -0.8, 1e-3), "{}", m.normal.y);
    assert!(collide(&circle(99.0), &at(61.0, 81.0), &rect(1.0, 1.0), &at(0.0, 0.0), bias()).is_none());
}

#[test]
fn concentric_circles_fall_back_to_x_axis() {
    let m = collide(&circle(1.0), &at(2.0, 2.0), &circle(0.5), &at(2.0, 2.0), bias())
        .expect("overlap");
    assert_eq!(m.normal, Vec2::UNIT_X);
    assert_eq!(m.penetration, Fix::from_f64(1.5));
    assert_eq!(m.points(), &[Vec2::from_ints(2, 2)]);
}

#[test]
fn circle_near_box_corner_touches_the_corner() {
    let m = collide(&circle(0.5), &at(1.3, 1.3), &rect(1.0, 1.0), &at(0.0, 0.0), bias())
        .expect("corner contact");
    assert_eq!(m.contact_count(), 1);
    assert_eq!(m.points(), &[Vec2::from_ints(1, 1)]);
    let expected = 0.5 - (0.3_f64 * 0.3 * 2.0).sqrt();
    assert!(near(m.penetration, expected, 1e-3), "{}", m.penetration);
    // From the circle toward the box.
    assert!(near(m.normal.x, -core::f64::consts::FRAC_1_SQRT_2, 1e-3));
    assert!(near(m.normal.y, -core::f64::consts::FRAC_1_SQRT_2, 1e-3));
}

#[test]
fn circle_beyond_corner_radius_misses() {
    assert!(collide(&circle(0.5), &at(1.4, 1.4), &rect(1.0, 1.0), &at(0.0, 0.0), bias()).is_none());
}

#[test]
fn circle_above_face_pushes_along_face_normal() {
    let m = collide(&circle(0.5), &at(0.0, 1.3), &rect(1.0, 1.0), &at(0.0, 0.0), bias())
        .expect("face contact");
    assert_eq!(m.normal, Vec2::new(Fix::ZERO, Fix::NEG_ONE));
    assert!(near(m.penetration, 0.2, 1e-4));
    assert!(near(m.points()[0].y, 0.8, 1e-4));
}

#[test]
fn circle_centre_inside_box_uses_deepest_face() {
    let m = collide(&circle(0.5), &at(0.0, 0.5), &rect(1.0, 1.0), &at(0.0, 0.0), bias())
        .expect("inside contact");
    assert_eq!(m.normal, Vec2::new(Fix::ZERO, Fix::NEG_ONE));
    assert_eq!(m.penetration, Fix::ONE);
    assert_eq!(m.points(), &[Vec2::ZERO]);
}

#[test]
fn rotated_box_contact_is_in_world_space() {
    // A diamond: the box turned 45 degrees has a vertex straight up at sqrt(2).
    let diamond = Transform2::from_angle(Vec2::ZERO, Fix::FRAC_PI_4);
    let m = collide(&circle(0.5), &at(0.0, 1.8), &rect(1.0, 1.0), &diamond, bias())
        .expect("vertex contact");
    assert!(near(m.normal.x, 0.0, 1e-3), "{:?}", m.normal);
    assert!(near(m.normal.y, -1.0, 1e-3), "{:?}", m.normal);
    assert!(near(m.points()[0].y, core::f64::consts::SQRT_2, 1e-3));
    assert!(near(m.penetration, 0.5 - (1.8 - core::f64::consts::SQRT_2), 2e-3));
}

#[test]
fn stacked_boxes_produce_two_clipped_contacts() {
    let m = collide(&rect(1.0, 1.0), &at(0.0, 0.0), &rect(1.0, 1.0), &at(0.0, 1.5), bias())
        .expect("overlap");
    assert_eq!(m.normal, Vec2::UNIT_Y);
    assert_eq!(m.penetration, Fix::HALF);
    assert_eq!(m.contact_count(), 2);
    let mut xs: Vec<Fix> = m.points().iter().map(|p| p.x).collect();
    xs.sort_unstable();
    assert_eq!(xs, vec![Fix::NEG_ONE, Fix::ONE]);
    assert!(m.points().iter().all(|p| p.y == Fix::ONE));
}

#[test]
fn offset_boxes_clip_to_the_overlap() {
    // Small box straddling the right edge of the big one.
    let m = collide(&rect(2.0, 0.5), &at(0.0, 0.0), &rect(0.5, 0.5), &at(2.0, 0.9), bias())
        .expect("overlap");
    assert_eq!(m.normal, Vec2::UNIT_Y);
    assert!(near(m.penetration, 0.1, 1e-4));
    assert_eq!(m.contact_count(), 2);
    for p in m.points() {
        assert!(p.x >= Fix::from_f64(1.5) && p.x <= Fix::TWO, "{p:?}");
    }
}

#[test]
fn separated_boxes_do_not_collide() {
    assert!(collide(&rect(1.0, 1.0), &at(0.0, 0.0), &rect(1.0, 1.0), &at(2.5, 0.0), bias()).is_none());
    assert!(collide(&rect(1.0, 1.0), &at(0.0, 0.0), &rect(1.0, 1.0), &at(0.0, 2.0), bias()).is_none());
}

#[test]
fn edge_and_circle_meet_on_the_chord() {
    let m = collide(&floor_edge(), &at(0.0, 0.0), &circle(0.5), &at(0.25, 0.4), bias())
        .expect("contact");
    assert_eq!(m.normal, Vec2::UNIT_Y);
    assert!(near(m.penetration, 0.1, 1e-4), "{}", m.penetration);
    assert_eq!(m.points()[0].y, Fix::ZERO);
    // The first chord intersection is at x = 0.25 - 0.3.
    assert!(near(m.points()[0].x, -0.05, 0.03), "{:?}", m.points());
}

#[test]
fn edge_normal_follows_edge_rotation() {
    let upside_down = Transform2::from_angle(Vec2::ZERO, Fix::PI);
    let m = collide(&floor_edge(), &upside_down, &circle(0.5), &at(0.0, -0.4), bias())
        .expect("contact");
    assert!(near(m.normal.y, -1.0, 1e-3), "{:?}", m.normal);
    assert!(near(m.penetration, 0.1, 1e-3));
}

#[test]
fn edge_ignores_circles_off_the_line() {
    assert!(collide(&floor_edge(), &at(0.0, 0.0), &circle(0.5), &at(0.0, 0.6), bias()).is_none());
    assert!(collide(&floor_edge(), &at(0.0, 0.0), &circle(0.5), &at(11.0, 0.0), bias()).is_none());
}

#[test]
fn pairs_without_a_routine_never_touch() {
    let origin = at(0.0, 0.0);
    assert!(collide(&rect(1.0, 1.0), &origin, &floor_edge(), &origin, bias()).is_none());
    assert!(collide(&floor_edge(), &origin, &rect(1.0, 1.0), &origin, bias()).is_none());
    assert!(collide(&floor_edge(), &origin, &floor_edge(), &origin, bias()).is_none());
}

fn assert_mirrored(forward: Option<ContactManifold>, backward: Option<ContactManifold>) {
    match (forward, backward) {
        (Some(f), Some(b)) => {
            assert_eq!(f.normal, -b.normal);
            assert_eq!(f.penetration, b.penetration);
            assert_eq!(f.points(), b.points());
        }
        (None, None) => {}
        (f, b) => panic!("asymmetric result: {f:?} vs {b:?}"),
    }
}

proptest! {
    #[test]
    fn circle_polygon_dispatch_is_mirror_symmetric(
        r in 1_i32..40,
        hw in 2_i32..40,
        hh in 2_i32..40,
        angle in -314_i32..314,
        cx in -60_i32..60,
        cy in -60_i32..60,
    ) {
        let c = Shape::Circle(Circle::new(Fix::from_ratio(r, 20)).expect("circle"));
        let p = Shape::Polygon(Polygon::rect(Fix::from_ratio(hw, 20), Fix::from_ratio(hh, 20)).expect("rect"));
        let xf_c = Transform2::new(Vec2::new(Fix::from_ratio(cx, 20), Fix::from_ratio(cy, 20)), Default::default());
        let xf_p = Transform2::from_angle(Vec2::ZERO, Fix::from_ratio(angle, 100));
        assert_mirrored(collide(&c, &xf_c, &p, &xf_p, bias()), collide(&p, &xf_p, &c, &xf_c, bias()));
    }

    #[test]
    fn circle_edge_dispatch_is_mirror_symmetric(
        r in 1_i32..40,
        cx in -250_i32..250,
        cy in -30_i32..30,
    ) {
        let c = Shape::Circle(Circle::new(Fix::from_ratio(r, 20)).expect("circle"));
        let e = floor_edge();
        let xf_c = Transform2::new(Vec2::new(Fix::from_ratio(cx, 20), Fix::from_ratio(cy, 20)), Default::default());
        let xf_e = Transform2::IDENTITY;
        assert_mirrored(collide(&c, &xf_c, &e, &xf_e, bias()), collide(&e, &xf_e, &c, &xf_c, bias()));
    }

    #[test]
    fn circle_polygon_contacts_are_bounded(
        r in 1_i32..40,
        cx in -60_i32..60,
        cy in -60_i32..60,
    ) {
        let radius = Fix::from_ratio(r, 20);
        let c = Shape::Circle(Circle::new(radius).expect("circle"));
        let p = rect(1.0, 1.0);
        let xf_c = Transform2::new(Vec2::new(Fix::from_ratio(cx, 20), Fix::from_ratio(cy, 20)), Default::default());
        if let Some(m) = collide(&c, &xf_c, &p, &Transform2::IDENTITY, bias()) {
            // Squared-distance rounding can admit a vertex a few raw units outside the radius.
            prop_assert!(m.penetration >= -Fix::from_raw(64));
            let len = m.normal.length();
            prop_assert!((len - Fix::ONE).abs() <= Fix::from_raw(8), "normal {:?}", m.normal);
        }
    }
}
