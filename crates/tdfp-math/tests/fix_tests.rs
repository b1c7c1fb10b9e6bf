// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used)]
use proptest::prelude::*;
use tdfp_math::Fix;

const SCALE: f64 = 65_536.0;

fn raw_err(actual: Fix, expected: f64) -> f64 {
    (f64::from(actual.raw()) - expected * SCALE).abs()
}

#[test]
fn constants_encode_expected_raw_values() {
    assert_eq!(Fix::ONE.raw(), 65_536);
    assert_eq!(Fix::HALF.raw(), 32_768);
    assert_eq!(Fix::PI.raw(), 205_887);
    assert_eq!(Fix::FRAC_PI_2.raw(), 102_944);
    assert_eq!(Fix::TAU.raw(), 411_775);
    assert_eq!(Fix::from_int(-3).raw(), -196_608);
}

#[test]
fn multiply_and_divide_round_to_nearest() {
    assert_eq!(Fix::from_f64(1.5) * Fix::from_int(2), Fix::from_int(3));
    assert_eq!((Fix::ONE / Fix::from_int(3)).raw(), 21_845);
    assert_eq!((Fix::TWO / Fix::from_int(3)).raw(), 43_691);
    assert_eq!(Fix::from_ratio(1, 4), Fix::from_f64(0.25));
    assert_eq!(Fix::from_int(7) / 2, Fix::from_f64(3.5));
}

#[test]
fn arithmetic_saturates_instead_of_wrapping() {
    assert_eq!(Fix::MAX + Fix::ONE, Fix::MAX);
    assert_eq!(Fix::MIN - Fix::ONE, Fix::MIN);
    assert_eq!(Fix::MAX * Fix::TWO, Fix::MAX);
    assert_eq!(Fix::MIN * Fix::TWO, Fix::MIN);
    assert_eq!(-Fix::MIN, Fix::MAX);
    assert_eq!(Fix::from_int(100_000), Fix::MAX);
}

#[test]
fn division_by_zero_saturates_by_dividend_sign() {
    assert_eq!(Fix::ONE / Fix::ZERO, Fix::MAX);
    assert_eq!(Fix::NEG_ONE / Fix::ZERO, Fix::MIN);
    assert_eq!(Fix::ZERO / Fix::ZERO, Fix::ZERO);
    assert_eq!(Fix::ONE.mul_div(Fix::ONE, Fix::ZERO), Fix::MAX);
}

#[test]
fn sqrt_is_exact_on_squares_and_zero_for_negatives() {
    assert_eq!(Fix::from_int(4).sqrt(), Fix::TWO);
    assert_eq!(Fix::from_int(9).sqrt(), Fix::from_int(3));
    assert_eq!(Fix::from_f64(0.25).sqrt(), Fix::HALF);
    assert_eq!(Fix::NEG_ONE.sqrt(), Fix::ZERO);
    assert!(raw_err(Fix::TWO.sqrt(), 2f64.sqrt()) <= 1.0);
}

#[test]
fn floor_ceil_and_sign_helpers() {
    let v = Fix::from_f64(-1.25);
    assert_eq!(v.floor_int(), -2);
    assert_eq!(v.ceil_int(), -1);
    assert_eq!(Fix::from_int(3).ceil_int(), 3);
    assert_eq!(v.abs(), Fix::from_f64(1.25));
    assert_eq!(v.signum(), Fix::NEG_ONE);
    assert!(v.is_negative());
}

#[test]
fn sin_cos_stays_within_two_raw_units() {
    let mut angle = -500_000;
    while angle <= 500_000 {
        let a = Fix::from_raw(angle);
        let (s, c) = a.sin_cos();
        let r = f64::from(angle) / SCALE;
        assert!(raw_err(s, r.sin()) <= 2.0, "sin({r}) = {s}");
        assert!(raw_err(c, r.cos()) <= 2.0, "cos({r}) = {c}");
        angle += 97;
    }
}

#[test]
fn sin_is_odd_and_cos_is_even_bit_exactly() {
    for raw in [1, 999, 51_472, 102_944, 300_000, 1_234_567] {
        let a = Fix::from_raw(raw);
        assert_eq!(a.sin(), -(-a).sin());
        assert_eq!(a.cos(), (-a).cos());
    }
}

#[test]
fn atan2_quadrants() {
    assert_eq!(Fix::ONE.atan2(Fix::ONE), Fix::FRAC_PI_4);
    assert_eq!(Fix::ZERO.atan2(Fix::NEG_ONE), Fix::PI);
    assert_eq!(Fix::ONE.atan2(Fix::ZERO), Fix::FRAC_PI_2);
    assert_eq!(Fix::ZERO.atan2(Fix::ZERO), Fix::ZERO);
    // -3π/4 rounds independently of PI and FRAC_PI_4.
    assert_eq!(Fix::NEG_ONE.atan2(Fix::NEG_ONE).raw(), -154_416);
}

#[test]
fn display_is_decimal() {
    assert_eq!(Fix::from_f64(0.5).to_string(), "0.5");
    assert_eq!(Fix::from_int(-12).to_string(), "-12");
    assert_eq!(format!("{:?}", Fix::from_f64(2.75)), "Fix(2.75)");
}

#[cfg(feature = "serde")]
#[test]
fn serde_encodes_raw_integer() {
    let json = serde_json::to_string(&Fix::ONE).expect("encode");
    assert_eq!(json, "65536");
    let back: Fix = serde_json::from_str("-32768").expect("decode");
    assert_eq!(back, -Fix::HALF);
}

fn small() -> impl Strategy<Value = Fix> {
    (-(1_i32 << 29)..(1_i32 << 29)).prop_map(Fix::from_raw)
}

proptest! {
    #[test]
    fn add_sub_round_trip(a in small(), b in small()) {
        prop_assert_eq!((a + b) - b, a);
    }

    #[test]
    fn mul_is_commutative(a in any::<i32>(), b in any::<i32>()) {
        let (a, b) = (Fix::from_raw(a), Fix::from_raw(b));
        prop_assert_eq!(a * b, b * a);
    }

    #[test]
    fn one_is_identity(a in any::<i32>()) {
        let a = Fix::from_raw(a);
        prop_assert_eq!(a * Fix::ONE, a);
        prop_assert_eq!(a / Fix::ONE, a);
    }

    #[test]
    fn atan2_within_one_raw_unit(y in -(1_i32 << 20)..(1_i32 << 20), x in -(1_i32 << 20)..(1_i32 << 20)) {
        prop_assume!(x != 0 || y != 0);
        let got = Fix::from_raw(y).atan2(Fix::from_raw(x));
        let want = f64::from(y).atan2(f64::from(x));
        prop_assert!(raw_err(got, want) <= 1.0, "atan2({}, {}) = {}", y, x, got);
    }

    #[test]
    fn sqrt_squares_back(a in 0_i32..(1 << 28)) {
        let v = Fix::from_raw(a);
        let r = v.sqrt();
        // isqrt floors, so r*r <= v < (r+eps)^2.
        let r_raw = i64::from(r.raw());
        let scaled = i64::from(a) << 16;
        prop_assert!(r_raw * r_raw <= scaled);
        prop_assert!((r_raw + 1) * (r_raw + 1) > scaled);
    }
}
