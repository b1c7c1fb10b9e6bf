// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The world: body storage, broad-phase bookkeeping, and the step pipeline.
//!
//! One [`World::step`] runs these phases strictly in order:
//! 1. broad phase: re-query proxies that moved, merge new candidate pairs into
//!    the pair cache, drop pairs whose fat boxes separated;
//! 2. narrow phase: fresh manifolds for every cached pair;
//! 3. half-step force integration;
//! 4. manifold initialization (resting contacts lose restitution);
//! 5. `iterations` sequential-impulse passes;
//! 6. velocity integration with the second half force step, then proxy moves;
//! 7. positional correction, then proxy moves for the corrected bodies;
//! 8. force clearing and contact event diffing.

use std::collections::BTreeSet;

use tdfp_geom::{Aabb, DynamicTree, ProxyId, RayCastInput, Transform2};
use tdfp_math::{Fix, Mat22, Vec2, Vec3};
use tracing::{debug, instrument, trace};

use crate::body::{BodyDef, BodyHandle, ForceMode, RigidBody};
use crate::config::WorldConfig;
use crate::digest::{self, Digest};
use crate::error::{ConfigError, WorldError};
use crate::events::{self, ContactEvent, ContactKind};
use crate::narrow::{self, ReferenceBias};
use crate::solver::{pair_mut, ContactConstraint};

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Tick number after the step (the first step reports `1`).
    pub tick: u64,
    /// Candidate pairs held by the broad phase during the step.
    pub pair_count: usize,
    /// Pairs whose shapes actually touched.
    pub contact_count: usize,
    /// Enter, stay, and exit notifications, ascending by `(body, other)`.
    pub events: Vec<ContactEvent>,
}

/// Closest body hit by [`World::raycast`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RayHit {
    /// Body hit.
    pub body: BodyHandle,
    /// Fraction of the segment at the hit point.
    pub fraction: Fix,
    /// World-space surface normal.
    pub normal: Vec2,
    /// World-space hit point.
    pub point: Vec2,
}

/// Pose of one body for render-transform synchronization.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransformSync {
    /// Body the pose belongs to.
    pub body: BodyHandle,
    /// Position lifted to 3D with `z = 0`.
    pub translation: Vec3,
    /// Rotation matrix.
    pub rotation: Mat22,
    /// Rotation angle in radians.
    pub angle: Fix,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Owns every body, the broad-phase tree, and the configuration.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    tree: DynamicTree<BodyHandle>,
    moved: Vec<ProxyId>,
    pairs: BTreeSet<(BodyHandle, BodyHandle)>,
    tick: u64,
}

impl World {
    /// Creates an empty world after validating `config`.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        debug!(
            dt = %config.dt,
            iterations = config.iterations,
            gravity_y = %config.gravity.y,
            "world created"
        );
        Ok(Self {
            config,
            slots: Vec::new(),
            free_slots: Vec::new(),
            tree: DynamicTree::new(config.fattening()),
            moved: Vec::new(),
            pairs: BTreeSet::new(),
            tick: 0,
        })
    }

    /// Active configuration.
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of completed steps.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Broad-phase tree, for inspection.
    pub const fn tree(&self) -> &DynamicTree<BodyHandle> {
        &self.tree
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    /// Live bodies in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.slots.iter().filter_map(|s| s.body.as_ref())
    }

    /// Looks up a live body.
    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, WorldError> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
            .ok_or(WorldError::InvalidHandle(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, WorldError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(WorldError::InvalidHandle(handle))
    }

    /// Adds a body and registers its proxy; it joins pairing on the next step.
    pub fn add_body(&mut self, def: BodyDef) -> Result<BodyHandle, WorldError> {
        let handle = match self.free_slots.pop() {
            Some(index) => {
                let generation = self.slots[index as usize].generation;
                BodyHandle { index, generation }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| WorldError::CapacityExhausted)?;
                self.slots.push(Slot {
                    generation: 0,
                    body: None,
                });
                BodyHandle {
                    index,
                    generation: 0,
                }
            }
        };

        let aabb = def
            .shape
            .compute_aabb(&Transform2::from_angle(def.position, def.angle));
        let proxy = self
            .tree
            .create_proxy(aabb, handle, self.config.aabb_margin);
        let body = RigidBody::from_def(handle, proxy, def, self.config.default_material);
        debug!(
            body = %handle,
            kind = ?body.shape().kind(),
            is_static = body.is_static(),
            "body added"
        );
        self.slots[handle.index as usize].body = Some(body);
        self.moved.push(proxy);
        Ok(handle)
    }

    /// Removes a body and its proxy, returning its final state.
    ///
    /// Bodies that were touching it receive an exit event on the next step.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody, WorldError> {
        self.body(handle)?;
        let slot = &mut self.slots[handle.index as usize];
        let body = slot.body.take().ok_or(WorldError::InvalidHandle(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);
        self.tree.destroy_proxy(body.proxy());
        self.moved.retain(|&p| p != body.proxy());
        self.pairs.retain(|&(a, b)| a != handle && b != handle);
        debug!(body = %handle, "body removed");
        Ok(body)
    }

    /// Teleports a body.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), WorldError> {
        let body = self.body_mut(handle)?;
        let displacement = position - body.position;
        body.position = position;
        self.sync_proxy(handle, displacement)
    }

    /// Sets a body's rotation in radians, stored wrapped into `[-π, π]`.
    pub fn set_rotation(&mut self, handle: BodyHandle, angle: Fix) -> Result<(), WorldError> {
        self.body_mut(handle)?.set_angle(angle);
        self.sync_proxy(handle, Vec2::ZERO)
    }

    /// Overwrites a body's linear velocity.
    pub fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec2,
    ) -> Result<(), WorldError> {
        self.body_mut(handle)?.linear_velocity = velocity;
        Ok(())
    }

    /// Overwrites a body's angular velocity.
    pub fn set_angular_velocity(&mut self, handle: BodyHandle, omega: Fix) -> Result<(), WorldError> {
        self.body_mut(handle)?.angular_velocity = omega;
        Ok(())
    }

    /// Applies a force or impulse; static bodies ignore it.
    pub fn add_force(
        &mut self,
        handle: BodyHandle,
        force: Vec2,
        mode: ForceMode,
    ) -> Result<(), WorldError> {
        self.body_mut(handle)?.add_force(force, mode);
        Ok(())
    }

    /// Accumulates torque for the next step; static bodies ignore it.
    pub fn add_torque(&mut self, handle: BodyHandle, torque: Fix) -> Result<(), WorldError> {
        let body = self.body_mut(handle)?;
        if !body.is_static() {
            body.torque += torque;
        }
        Ok(())
    }

    /// Advances by the configured time step.
    pub fn step(&mut self) -> StepReport {
        self.advance(self.config.dt)
    }

    /// Advances by `dt`, which must be positive.
    pub fn step_dt(&mut self, dt: Fix) -> Result<StepReport, WorldError> {
        if !dt.is_positive() {
            return Err(ConfigError::NonPositiveTimeStep.into());
        }
        Ok(self.advance(dt))
    }

    #[instrument(level = "debug", skip(self), fields(tick = self.tick + 1))]
    fn advance(&mut self, dt: Fix) -> StepReport {
        self.update_pairs();
        let pair_count = self.pairs.len();

        let mut constraints = self.narrow_phase();
        let contact_count = self.touching_pair_count();
        trace!(pair_count, contact_count, solid = constraints.len(), "narrow phase");

        let half_dt = dt / 2;
        let gravity = self.config.gravity;
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            body.integrate_forces(gravity, half_dt);
        }

        let resting = self.config.resting_threshold();
        for c in &mut constraints {
            if let Some((a, b)) = self.body_pair(c.a, c.b) {
                c.initialize(a, b, resting);
            }
        }

        let min_friction = self.config.min_friction_impulse;
        for _ in 0..self.config.iterations {
            for c in &constraints {
                if let Some((a, b)) = self.body_pair_mut(c.a, c.b) {
                    c.apply_impulse(a, b, min_friction);
                }
            }
        }

        self.integrate_velocities(dt, gravity, half_dt);

        let slop = self.config.penetration_slop;
        let factor = self.config.penetration_correction;
        let Self {
            slots, tree, moved, ..
        } = &mut *self;
        for c in &constraints {
            let Some((sa, sb)) = pair_mut(slots, c.a, c.b) else {
                continue;
            };
            let (Some(a), Some(b)) = (sa.body.as_mut(), sb.body.as_mut()) else {
                continue;
            };
            let (offset_a, offset_b) = c.positional_correction(a, b, slop, factor);
            for (body, offset) in [(a, offset_a), (b, offset_b)] {
                if offset != Vec2::ZERO {
                    move_proxy(tree, moved, body, offset);
                }
            }
        }

        let mut events = Vec::new();
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            body.clear_forces();
            events::diff_touching(body.handle, &body.touching, &body.touching_last, &mut events);
            body.touching_last = core::mem::take(&mut body.touching);
        }

        self.tick += 1;
        trace!(events = events.len(), moved = self.moved.len(), "step complete");
        StepReport {
            tick: self.tick,
            pair_count,
            contact_count,
            events,
        }
    }

    /// Re-queries moved proxies and refreshes the pair cache.
    fn update_pairs(&mut self) {
        let mut moved = core::mem::take(&mut self.moved);
        moved.sort_unstable();
        moved.dedup();

        let tree = &self.tree;
        let mut candidates = Vec::new();
        for &proxy in &moved {
            let (Some(fat), Some(owner)) = (tree.fat_aabb(proxy), tree.user_data(proxy)) else {
                continue;
            };
            tree.query(&fat, |other| {
                if other != proxy {
                    if let Some(handle) = tree.user_data(other) {
                        candidates.push((owner.min(handle), owner.max(handle)));
                    }
                }
                true
            });
        }
        candidates.sort_unstable();
        candidates.dedup();
        let fresh = candidates.len();
        self.pairs.extend(candidates);

        let slots = &self.slots;
        let fat_of = |h: BodyHandle| {
            slots
                .get(h.index as usize)
                .filter(|s| s.generation == h.generation)
                .and_then(|s| s.body.as_ref())
                .and_then(|b| tree.fat_aabb(b.proxy()))
        };
        self.pairs.retain(|&(a, b)| match (fat_of(a), fat_of(b)) {
            (Some(fa), Some(fb)) => fa.overlaps(&fb),
            _ => false,
        });
        trace!(moved = moved.len(), fresh, cached = self.pairs.len(), "broad phase");
    }

    /// Builds constraints for touching solid pairs and records touching sets.
    fn narrow_phase(&mut self) -> Vec<ContactConstraint> {
        let bias = ReferenceBias::from(&self.config);
        let mut constraints = Vec::new();
        let mut touches = Vec::new();
        for &(ha, hb) in &self.pairs {
            let (Ok(a), Ok(b)) = (self.body(ha), self.body(hb)) else {
                continue;
            };
            let Some(manifold) =
                narrow::collide(a.shape(), &a.transform(), b.shape(), &b.transform(), bias)
            else {
                continue;
            };
            let kind = if a.is_trigger() || b.is_trigger() {
                ContactKind::Trigger
            } else {
                ContactKind::Collision
            };
            touches.push((ha, hb, kind));
            if kind == ContactKind::Collision {
                constraints.push(ContactConstraint::new(
                    ha.index as usize,
                    hb.index as usize,
                    manifold,
                    a,
                    b,
                ));
            }
        }
        for (ha, hb, kind) in touches {
            if let Ok(a) = self.body_mut(ha) {
                a.touching.insert(hb, kind);
            }
            if let Ok(b) = self.body_mut(hb) {
                b.touching.insert(ha, kind);
            }
        }
        constraints
    }

    /// Number of distinct touching pairs recorded this step.
    fn touching_pair_count(&self) -> usize {
        self.bodies()
            .flat_map(|b| b.touching.keys().map(move |&o| (b.handle(), o)))
            .filter(|(me, other)| me < other)
            .count()
    }

    fn integrate_velocities(&mut self, dt: Fix, gravity: Vec2, half_dt: Fix) {
        let Self {
            slots, tree, moved, ..
        } = self;
        for body in slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.is_static() {
                continue;
            }
            let displacement = body.linear_velocity * dt;
            body.position += displacement;
            body.set_angle(body.angle + body.angular_velocity * dt);
            body.integrate_forces(gravity, half_dt);
            move_proxy(tree, moved, body, displacement);
        }
    }

    fn sync_proxy(&mut self, handle: BodyHandle, displacement: Vec2) -> Result<(), WorldError> {
        let Self {
            slots, tree, moved, ..
        } = self;
        let body = slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
            .ok_or(WorldError::InvalidHandle(handle))?;
        move_proxy(tree, moved, body, displacement);
        Ok(())
    }

    fn body_pair(&self, a: usize, b: usize) -> Option<(&RigidBody, &RigidBody)> {
        let a = self.slots.get(a)?.body.as_ref()?;
        let b = self.slots.get(b)?.body.as_ref()?;
        Some((a, b))
    }

    fn body_pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let (sa, sb) = pair_mut(&mut self.slots, a, b)?;
        Some((sa.body.as_mut()?, sb.body.as_mut()?))
    }

    /// Bodies whose tight bounds overlap `aabb`, sorted by handle.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut hits = Vec::new();
        self.tree.query(aabb, |proxy| {
            if let Some(handle) = self.tree.user_data(proxy) {
                if self.body(handle).is_ok_and(|b| b.aabb().overlaps(aabb)) {
                    hits.push(handle);
                }
            }
            true
        });
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Closest body crossed by the segment `p1 -> p2`.
    pub fn raycast(&self, p1: Vec2, p2: Vec2) -> Option<RayHit> {
        let input = RayCastInput::new(p1, p2);
        let mut best: Option<RayHit> = None;
        self.tree.raycast(&input, |sub, proxy| {
            let Some(handle) = self.tree.user_data(proxy) else {
                return -Fix::ONE;
            };
            let Ok(body) = self.body(handle) else {
                return -Fix::ONE;
            };
            let Some(out) = body.shape().ray_cast(&body.transform(), sub) else {
                return sub.max_fraction;
            };
            let better = best.is_none_or(|b| {
                out.fraction < b.fraction || (out.fraction == b.fraction && handle < b.body)
            });
            if better {
                best = Some(RayHit {
                    body: handle,
                    fraction: out.fraction,
                    normal: out.normal,
                    point: input.point_at(out.fraction),
                });
            }
            out.fraction
        });
        best
    }

    /// Moves the world origin to `new_origin`, translating every body.
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            body.position -= new_origin;
            body.refresh_aabb();
        }
        self.tree.shift_origin(new_origin);
        debug!(x = %new_origin.x, y = %new_origin.y, "origin shifted");
    }

    /// Current pose of every live body, in handle order.
    pub fn transforms(&self) -> Vec<TransformSync> {
        self.bodies()
            .map(|b| TransformSync {
                body: b.handle(),
                translation: b.position().extend(Fix::ZERO),
                rotation: b.rotation(),
                angle: b.angle(),
            })
            .collect()
    }

    /// BLAKE3 digest of tick and body state; see [`crate::digest`].
    pub fn state_digest(&self) -> Digest {
        digest::state_digest(self.tick, self.bodies())
    }
}

fn move_proxy(
    tree: &mut DynamicTree<BodyHandle>,
    moved: &mut Vec<ProxyId>,
    body: &mut RigidBody,
    displacement: Vec2,
) {
    let aabb = body.refresh_aabb();
    if tree.move_proxy(body.proxy(), aabb, displacement) {
        moved.push(body.proxy());
    }
}
