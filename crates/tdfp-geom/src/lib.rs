// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![doc = r"Geometry primitives and broad phase for tdfp.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) with the perimeter cost metric.
- Rigid 2D transforms (`Transform2`).
- Ray cast records shared by boxes, shapes, and the tree.
- A `BroadPhase` trait, a dynamic AABB tree, and an all-pairs baseline.

Design notes:
- Deterministic: no ambient RNG; ordering of pair outputs is canonical.
- Q16.16 fixed point throughout (`tdfp_math::Fix`).
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Broad-phase structures.
pub mod broad;
/// Foundational geometric types.
pub mod types;

pub use broad::{BroadPhase, BruteForce, DynamicTree, Fattening, ProxyId, TreeError};
pub use types::aabb::Aabb;
pub use types::ray::{RayCastInput, RayCastOutput};
pub use types::transform::Transform2;
