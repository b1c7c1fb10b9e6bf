// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types (AABB, transform, ray cast records).
//!
//! Determinism notes:
//! - Overlap semantics are inclusive on faces to avoid pair churn on contact
//!   boundaries.
//! - All math is [`tdfp_math::Fix`], so results are bit-identical everywhere.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Ray cast input and output records."]
pub mod ray;
#[doc = "Rigid 2D transforms."]
pub mod transform;
