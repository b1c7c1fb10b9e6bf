// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World configuration.
//!
//! All values are plain data supplied by the host; the world never reads
//! files. Defaults match a 60 Hz fixed tick with Earth-ish gravity rounded to
//! `-10`.

use tdfp_geom::Fattening;
use tdfp_math::{Fix, Vec2};

use crate::error::ConfigError;
use crate::material::Material;

/// Tunables consumed by [`crate::World`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Fixed time step used by [`crate::World::step`].
    pub dt: Fix,
    /// Gravity acceleration, scaled per body by its gravity scale.
    pub gravity: Vec2,
    /// Sequential-impulse passes per step.
    pub iterations: u32,
    /// Margin added on every side of a proxy's fat AABB.
    pub aabb_margin: Fix,
    /// Scale on the frame displacement used to stretch a re-inserted fat AABB.
    pub aabb_multiplier: Fix,
    /// Penetration tolerated before positional correction kicks in.
    pub penetration_slop: Fix,
    /// Fraction of the remaining penetration removed per step.
    pub penetration_correction: Fix,
    /// Added to `(gravity * dt)^2` to form the resting-contact threshold.
    pub resting_epsilon: Fix,
    /// Tangential impulses at or below this magnitude are skipped.
    pub min_friction_impulse: Fix,
    /// Relative bias favoring polygon A as the reference face.
    pub bias_relative: Fix,
    /// Absolute bias favoring polygon A as the reference face.
    pub bias_absolute: Fix,
    /// Material given to bodies that do not specify one.
    pub default_material: Material,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dt: Fix::from_ratio(1, 60),
            gravity: Vec2::from_ints(0, -10),
            iterations: 1,
            aabb_margin: Fix::from_ratio(1, 5),
            aabb_multiplier: Fix::ONE,
            penetration_slop: Fix::from_ratio(1, 20),
            penetration_correction: Fix::from_ratio(2, 5),
            resting_epsilon: Fix::EPSILON,
            min_friction_impulse: Fix::ZERO,
            bias_relative: Fix::from_ratio(95, 100),
            bias_absolute: Fix::from_ratio(1, 100),
            default_material: Material::default(),
        }
    }
}

impl WorldConfig {
    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_positive() {
            return Err(ConfigError::NonPositiveTimeStep);
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        let non_negative = [
            ("aabb_margin", self.aabb_margin),
            ("aabb_multiplier", self.aabb_multiplier),
            ("penetration_slop", self.penetration_slop),
            ("resting_epsilon", self.resting_epsilon),
            ("min_friction_impulse", self.min_friction_impulse),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, v)| v.is_negative()) {
            return Err(ConfigError::Negative(name));
        }
        if self.penetration_correction.is_negative() || self.penetration_correction > Fix::ONE {
            return Err(ConfigError::CorrectionOutOfRange);
        }
        Ok(())
    }

    /// Squared relative speed under which restitution is suppressed.
    pub fn resting_threshold(&self) -> Fix {
        (self.gravity * self.dt).length_squared() + self.resting_epsilon
    }

    /// Broad-phase re-insertion policy.
    pub const fn fattening(&self) -> Fattening {
        Fattening {
            margin: self.aabb_margin,
            multiplier: self.aabb_multiplier,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_fields() {
        let base = WorldConfig::default();
        let cases = [
            (
                WorldConfig {
                    dt: Fix::ZERO,
                    ..base
                },
                ConfigError::NonPositiveTimeStep,
            ),
            (
                WorldConfig {
                    iterations: 0,
                    ..base
                },
                ConfigError::ZeroIterations,
            ),
            (
                WorldConfig {
                    penetration_slop: Fix::NEG_ONE,
                    ..base
                },
                ConfigError::Negative("penetration_slop"),
            ),
            (
                WorldConfig {
                    penetration_correction: Fix::TWO,
                    ..base
                },
                ConfigError::CorrectionOutOfRange,
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn resting_threshold_tracks_gravity_step() {
        let config = WorldConfig::default();
        // (10 / 60)^2 ~= 0.0278
        let t = config.resting_threshold().to_f64();
        assert!((t - 0.0278).abs() < 0.001, "{t}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "iterations": 8, "gravity": { "x": 0, "y": -655360 } }"#)
                .expect("decode");
        assert_eq!(config.iterations, 8);
        assert_eq!(config.gravity, Vec2::from_ints(0, -10));
        assert_eq!(config.dt, WorldConfig::default().dt);
        let text = serde_json::to_string(&config).expect("encode");
        let back: WorldConfig = serde_json::from_str(&text).expect("decode");
        assert_eq!(back, config);
    }
}
