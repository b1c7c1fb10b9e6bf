// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State digest computation.
//!
//! Determinism contract
//! - The digest is a BLAKE3 hash over a canonical byte stream encoding the
//!   simulated state of every live body.
//! - Ordering is explicit and stable: bodies are visited in ascending
//!   [`BodyHandle`] order (slot index, then generation).
//! - Encoding is fixed-size and architecture-independent: integers and raw
//!   `Fix` values are written little-endian.
//! - Cached data that is a pure function of the encoded fields (rotation
//!   matrix, bounds, proxies) is left out.
//!
//! Layout
//! 1) Tick as 8-byte LE, then the live body count as 8-byte LE.
//! 2) Per body: index and generation (4-byte LE each), position x/y, angle,
//!    linear velocity x/y, angular velocity (raw `i32` LE each).

use blake3::Hasher;
use tdfp_math::{Fix, Vec2};

use crate::body::{BodyHandle, RigidBody};

/// 32-byte state digest.
pub type Digest = [u8; 32];

pub(crate) fn state_digest<'a, I>(tick: u64, bodies: I) -> Digest
where
    I: IntoIterator<Item = &'a RigidBody>,
{
    let mut bodies: Vec<&RigidBody> = bodies.into_iter().collect();
    bodies.sort_by_key(|b| b.handle());

    let mut hasher = Hasher::new();
    hasher.update(&tick.to_le_bytes());
    hasher.update(&(bodies.len() as u64).to_le_bytes());
    for body in bodies {
        encode_handle(&mut hasher, body.handle());
        encode_vec(&mut hasher, body.position());
        encode_fix(&mut hasher, body.angle());
        encode_vec(&mut hasher, body.linear_velocity());
        encode_fix(&mut hasher, body.angular_velocity());
    }
    *hasher.finalize().as_bytes()
}

fn encode_handle(hasher: &mut Hasher, handle: BodyHandle) {
    hasher.update(&handle.index().to_le_bytes());
    hasher.update(&handle.generation().to_le_bytes());
}

fn encode_fix(hasher: &mut Hasher, value: Fix) {
    hasher.update(&value.raw().to_le_bytes());
}

fn encode_vec(hasher: &mut Hasher, value: Vec2) {
    encode_fix(hasher, value.x);
    encode_fix(hasher, value.y);
}

/// Lowercase hex rendering of a digest, for logs and reports.
pub fn digest_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}
