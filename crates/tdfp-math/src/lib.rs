// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! tdfp-math: deterministic fixed-point math kernel.
//!
//! Everything here is integer arithmetic on a Q16.16 [`Fix`] scalar, so a
//! given sequence of operations yields the same bits on every target. This is
//! the foundation that lets two lockstep peers (or a replay) agree on a
//! simulation without exchanging state.
//!
//! - [`Fix`]: saturating scalar with deterministic `sqrt`, `sin_cos`, `atan2`.
//! - [`Vec2`]/[`Vec3`]: vector algebra over [`Fix`].
//! - [`Mat22`]: 2D rotation matrix (transpose is the inverse).
#![forbid(unsafe_code)]

mod fix;
mod mat22;
mod trig;
mod vec2;
mod vec3;

pub use fix::{Fix, FRAC_BITS};
pub use mat22::Mat22;
pub use vec2::Vec2;
pub use vec3::Vec3;
