// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![doc = r"Deterministic 2D rigid-body world for tdfp.

This crate provides:
- Convex shapes (`Circle`, `Polygon`, `EdgeChain`) and mass properties.
- Rigid bodies addressed by generational `BodyHandle`s.
- A narrow phase producing contact manifolds for every supported shape pair.
- A sequential-impulse solver with Coulomb friction and positional correction.
- `World`, which owns bodies and the broad-phase tree and runs the fixed
  step pipeline, returning contact events as plain data.
- BLAKE3 state digests and a pair-run determinism harness.

Design notes:
- Q16.16 fixed point only; the same inputs produce the same bits everywhere.
- No globals: every operation goes through an owned `World`.
- Iteration orders are canonical (handle order, sorted pairs), never hash
  order.
"]

pub mod body;
pub mod config;
pub mod determinism;
pub mod digest;
pub mod error;
pub mod events;
/// Mass and inertia derived from shapes or supplied directly.
pub mod mass;
/// Friction and restitution coefficients and their pair combination rules.
pub mod material;
pub mod narrow;
pub mod shape;
mod solver;
pub mod world;

pub use body::{BodyDef, BodyHandle, ForceMode, RigidBody};
pub use config::WorldConfig;
pub use digest::{digest_hex, Digest};
pub use error::{ConfigError, DeterminismError, ShapeError, WorldError};
pub use events::{ContactEvent, ContactKind, ContactPhase};
pub use mass::MassProps;
pub use material::Material;
pub use narrow::{collide, ContactManifold, ReferenceBias};
pub use shape::{Circle, EdgeChain, Polygon, Shape, ShapeKind, MAX_POLYGON_VERTICES};
pub use world::{RayHit, StepReport, TransformSync, World};
