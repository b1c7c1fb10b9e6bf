// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid bodies and their handles.

use core::fmt;
use std::collections::BTreeMap;

use tdfp_geom::{Aabb, ProxyId, Transform2};
use tdfp_math::{Fix, Mat22, Vec2};

use crate::events::ContactKind;
use crate::mass::MassProps;
use crate::material::Material;
use crate::shape::Shape;

/// Generational reference to a body owned by a [`crate::World`].
///
/// A slot index is reused after removal, but with a bumped generation, so a
/// stale handle never aliases a newer body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl BodyHandle {
    /// Slot index inside the world.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}v{}", self.index, self.generation)
    }
}

/// How [`crate::World::add_force`] applies its vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ForceMode {
    /// Accumulated and integrated over the next step, then cleared.
    Force,
    /// Immediate change of momentum.
    Impulse,
}

/// Everything needed to create a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDef {
    /// Collision shape, in body-local coordinates.
    pub shape: Shape,
    /// Mass properties; [`MassProps::STATIC`] for immovable bodies.
    pub mass: MassProps,
    /// Surface material; the world default when `None`.
    pub material: Option<Material>,
    /// Initial world position.
    pub position: Vec2,
    /// Initial rotation in radians.
    pub angle: Fix,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second.
    pub angular_velocity: Fix,
    /// Multiplier on world gravity.
    pub gravity_scale: Fix,
    /// Triggers report contacts but never receive impulses.
    pub is_trigger: bool,
}

impl BodyDef {
    /// Static body at the origin with default material.
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            mass: MassProps::STATIC,
            material: None,
            position: Vec2::ZERO,
            angle: Fix::ZERO,
            linear_velocity: Vec2::ZERO,
            angular_velocity: Fix::ZERO,
            gravity_scale: Fix::ONE,
            is_trigger: false,
        }
    }

    /// Sets mass properties.
    pub fn with_mass(mut self, mass: MassProps) -> Self {
        self.mass = mass;
        self
    }

    /// Derives mass properties from the shape at `density`.
    pub fn with_density(mut self, density: Fix) -> Self {
        self.mass = MassProps::from_shape(&self.shape, density);
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Sets the initial position.
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial rotation in radians.
    pub fn with_angle(mut self, angle: Fix) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the initial linear velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, omega: Fix) -> Self {
        self.angular_velocity = omega;
        self
    }

    /// Sets the gravity multiplier.
    pub fn with_gravity_scale(mut self, scale: Fix) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Marks the body as a trigger.
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// Simulated body state.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) handle: BodyHandle,
    pub(crate) shape: Shape,
    pub(crate) position: Vec2,
    pub(crate) angle: Fix,
    pub(crate) rotation: Mat22,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: Fix,
    pub(crate) force: Vec2,
    pub(crate) torque: Fix,
    pub(crate) mass: MassProps,
    pub(crate) inv_mass: Fix,
    pub(crate) inv_inertia: Fix,
    pub(crate) material: Material,
    pub(crate) gravity_scale: Fix,
    pub(crate) is_trigger: bool,
    pub(crate) aabb: Aabb,
    pub(crate) proxy: ProxyId,
    pub(crate) touching: BTreeMap<BodyHandle, ContactKind>,
    pub(crate) touching_last: BTreeMap<BodyHandle, ContactKind>,
}

impl RigidBody {
    pub(crate) fn from_def(
        handle: BodyHandle,
        proxy: ProxyId,
        def: BodyDef,
        default_material: Material,
    ) -> Self {
        let (inv_mass, inv_inertia) = def.mass.inverse();
        let angle = def.angle.wrap_angle();
        let rotation = Mat22::from_angle(angle);
        let aabb = def
            .shape
            .compute_aabb(&Transform2::new(def.position, rotation));
        Self {
            handle,
            shape: def.shape,
            position: def.position,
            angle,
            rotation,
            linear_velocity: def.linear_velocity,
            angular_velocity: def.angular_velocity,
            force: Vec2::ZERO,
            torque: Fix::ZERO,
            mass: def.mass,
            inv_mass,
            inv_inertia,
            material: def.material.unwrap_or(default_material),
            gravity_scale: def.gravity_scale,
            is_trigger: def.is_trigger,
            aabb,
            proxy,
            touching: BTreeMap::new(),
            touching_last: BTreeMap::new(),
        }
    }

    /// Handle of this body.
    pub const fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Collision shape.
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// World position of the body origin.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation in radians, accumulated without wrapping.
    pub const fn angle(&self) -> Fix {
        self.angle
    }

    /// Rotation matrix matching [`Self::angle`].
    pub const fn rotation(&self) -> Mat22 {
        self.rotation
    }

    /// Pose as a transform.
    pub const fn transform(&self) -> Transform2 {
        Transform2::new(self.position, self.rotation)
    }

    /// Linear velocity.
    pub const fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    /// Angular velocity in radians per second.
    pub const fn angular_velocity(&self) -> Fix {
        self.angular_velocity
    }

    /// Force accumulated since the last step.
    pub const fn force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated since the last step.
    pub const fn torque(&self) -> Fix {
        self.torque
    }

    /// Mass properties as supplied.
    pub const fn mass(&self) -> MassProps {
        self.mass
    }

    /// Inverse mass; zero for static bodies.
    pub const fn inv_mass(&self) -> Fix {
        self.inv_mass
    }

    /// Inverse inertia; zero when rotation is locked.
    pub const fn inv_inertia(&self) -> Fix {
        self.inv_inertia
    }

    /// Surface material.
    pub const fn material(&self) -> Material {
        self.material
    }

    /// Gravity multiplier.
    pub const fn gravity_scale(&self) -> Fix {
        self.gravity_scale
    }

    /// Whether this body only reports contacts.
    pub const fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// `true` for infinite-mass bodies.
    pub fn is_static(&self) -> bool {
        self.inv_mass.is_zero()
    }

    /// Cached tight world bounds.
    pub const fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Broad-phase proxy of this body.
    pub const fn proxy(&self) -> ProxyId {
        self.proxy
    }

    /// Bodies touched during the last completed step, in handle order.
    pub fn touching(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.touching_last.keys().copied()
    }

    /// Applies an impulse at `contact` (offset from the body origin).
    pub(crate) fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * contact.cross(impulse);
    }

    pub(crate) fn add_force(&mut self, v: Vec2, mode: ForceMode) {
        if self.is_static() {
            return;
        }
        match mode {
            ForceMode::Force => self.force += v,
            ForceMode::Impulse => self.linear_velocity += v * self.inv_mass,
        }
    }

    /// Half-step velocity update from gravity and accumulated forces.
    pub(crate) fn integrate_forces(&mut self, gravity: Vec2, half_dt: Fix) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += (self.force * self.inv_mass + gravity * self.gravity_scale) * half_dt;
        self.angular_velocity += self.torque * self.inv_inertia * half_dt;
    }

    /// Stores `angle` wrapped into `[-π, π]` so a spinning body never
    /// saturates its orientation.
    pub(crate) fn set_angle(&mut self, angle: Fix) {
        self.angle = angle.wrap_angle();
        self.rotation = Mat22::from_angle(self.angle);
    }

    /// Recomputes the tight bounds, returning the new box.
    pub(crate) fn refresh_aabb(&mut self) -> Aabb {
        self.aabb = self.shape.compute_aabb(&self.transform());
        self.aabb
    }

    pub(crate) fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = Fix::ZERO;
    }
}
