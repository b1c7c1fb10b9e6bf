// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scene files.
//!
//! Scenes are authored in decimal floats for convenience. Every value is
//! converted to [`Fix`] exactly once, when the world is built, so two runs of
//! the same file always start from identical bits.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tdfp_math::{Fix, Vec2};
use tdfp_world::{
    BodyDef, Circle, EdgeChain, MassProps, Material, Polygon, Shape, World, WorldConfig,
    WorldError,
};

/// A world configuration plus the bodies to spawn, in spawn order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneFile {
    /// Overrides applied on top of [`WorldConfig::default`].
    pub config: ConfigSpec,
    /// Bodies, added in this order (which fixes their handles).
    pub bodies: Vec<BodySpec>,
}

/// Optional world tunables; absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigSpec {
    /// Fixed time step in seconds.
    pub dt: Option<f64>,
    /// Gravity vector.
    pub gravity: Option<[f64; 2]>,
    /// Solver passes per step.
    pub iterations: Option<u32>,
    /// Fat AABB margin.
    pub aabb_margin: Option<f64>,
    /// Displacement multiplier for fat AABB prediction.
    pub aabb_multiplier: Option<f64>,
    /// Allowed penetration before correction.
    pub penetration_slop: Option<f64>,
    /// Fraction of penetration corrected per step.
    pub penetration_correction: Option<f64>,
    /// Minimum tangential impulse that is applied.
    pub min_friction_impulse: Option<f64>,
    /// Material for bodies that do not name one.
    pub material: Option<MaterialSpec>,
}

/// Surface coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialSpec {
    /// Static friction coefficient.
    pub static_friction: Option<f64>,
    /// Dynamic friction coefficient.
    pub dynamic_friction: Option<f64>,
    /// Coefficient of restitution.
    pub restitution: Option<f64>,
}

/// Collision geometry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ShapeSpec {
    /// Disc centred on the body origin.
    Circle {
        /// Radius.
        radius: f64,
    },
    /// Axis-aligned box in body space.
    Rect {
        /// Half width.
        half_width: f64,
        /// Half height.
        half_height: f64,
    },
    /// Convex hull of the listed points.
    Polygon {
        /// Body-space points.
        points: Vec<[f64; 2]>,
    },
    /// One-sided segment chain; solid side on the left.
    Edge {
        /// Body-space points.
        points: Vec<[f64; 2]>,
    },
}

/// One body in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodySpec {
    /// Collision geometry.
    pub shape: ShapeSpec,
    /// World position.
    #[serde(default)]
    pub position: [f64; 2],
    /// Rotation in radians.
    #[serde(default)]
    pub angle: f64,
    /// Initial linear velocity.
    #[serde(default)]
    pub velocity: [f64; 2],
    /// Initial angular velocity.
    #[serde(default)]
    pub angular_velocity: f64,
    /// Derive mass from area; ignored when `mass` is given.
    #[serde(default)]
    pub density: Option<f64>,
    /// Explicit mass; omit both `mass` and `density` for a static body.
    #[serde(default)]
    pub mass: Option<f64>,
    /// Explicit rotational inertia used with `mass`.
    #[serde(default)]
    pub inertia: Option<f64>,
    /// Per-body material override.
    #[serde(default)]
    pub material: Option<MaterialSpec>,
    /// Gravity multiplier.
    #[serde(default)]
    pub gravity_scale: Option<f64>,
    /// Report overlaps without pushing.
    #[serde(default)]
    pub trigger: bool,
}

fn vec2(v: [f64; 2]) -> Vec2 {
    Vec2::from_f64(v[0], v[1])
}

impl MaterialSpec {
    fn over(self, base: Material) -> Material {
        Material {
            static_friction: self.static_friction.map_or(base.static_friction, Fix::from_f64),
            dynamic_friction: self
                .dynamic_friction
                .map_or(base.dynamic_friction, Fix::from_f64),
            restitution: self.restitution.map_or(base.restitution, Fix::from_f64),
        }
    }
}

impl ConfigSpec {
    /// Applies the overrides to the default configuration.
    pub fn to_config(&self) -> WorldConfig {
        let base = WorldConfig::default();
        let fix_or = |v: Option<f64>, d: Fix| v.map_or(d, Fix::from_f64);
        WorldConfig {
            dt: fix_or(self.dt, base.dt),
            gravity: self.gravity.map_or(base.gravity, vec2),
            iterations: self.iterations.unwrap_or(base.iterations),
            aabb_margin: fix_or(self.aabb_margin, base.aabb_margin),
            aabb_multiplier: fix_or(self.aabb_multiplier, base.aabb_multiplier),
            penetration_slop: fix_or(self.penetration_slop, base.penetration_slop),
            penetration_correction: fix_or(
                self.penetration_correction,
                base.penetration_correction,
            ),
            min_friction_impulse: fix_or(self.min_friction_impulse, base.min_friction_impulse),
            default_material: self
                .material
                .map_or(base.default_material, |m| m.over(base.default_material)),
            ..base
        }
    }
}

impl ShapeSpec {
    /// Builds the validated shape.
    pub fn to_shape(&self) -> Result<Shape, WorldError> {
        let points = |ps: &[[f64; 2]]| ps.iter().copied().map(vec2).collect::<Vec<_>>();
        Ok(match self {
            Self::Circle { radius } => Circle::new(Fix::from_f64(*radius))?.into(),
            Self::Rect {
                half_width,
                half_height,
            } => Polygon::rect(Fix::from_f64(*half_width), Fix::from_f64(*half_height))?.into(),
            Self::Polygon { points: ps } => Polygon::new(&points(ps))?.into(),
            Self::Edge { points: ps } => EdgeChain::new(&points(ps))?.into(),
        })
    }
}

impl BodySpec {
    /// Converts to a [`BodyDef`]; `default_material` backs partial overrides.
    pub fn to_def(&self, default_material: Material) -> Result<BodyDef, WorldError> {
        let mut def = BodyDef::new(self.shape.to_shape()?)
            .at(vec2(self.position))
            .with_angle(Fix::from_f64(self.angle))
            .with_velocity(vec2(self.velocity))
            .with_angular_velocity(Fix::from_f64(self.angular_velocity));
        if let Some(density) = self.density {
            def = def.with_density(Fix::from_f64(density));
        }
        if let Some(mass) = self.mass {
            let inertia = self.inertia.map_or(Fix::ZERO, Fix::from_f64);
            def = def.with_mass(MassProps::new(Fix::from_f64(mass), inertia));
        }
        if let Some(material) = self.material {
            def = def.with_material(material.over(default_material));
        }
        if let Some(scale) = self.gravity_scale {
            def = def.with_gravity_scale(Fix::from_f64(scale));
        }
        if self.trigger {
            def = def.trigger();
        }
        Ok(def)
    }
}

impl SceneFile {
    /// Parses a scene from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse scene JSON")
    }

    /// Reads and parses a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in scene {}", path.display()))
    }

    /// Builds a fresh world with every body added in file order.
    pub fn build(&self) -> Result<World, WorldError> {
        let config = self.config.to_config();
        let mut world = World::new(config)?;
        for spec in &self.bodies {
            world.add_body(spec.to_def(config.default_material)?)?;
        }
        Ok(world)
    }
}
