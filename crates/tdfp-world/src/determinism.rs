// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pair-run determinism harness.
//!
//! Builds two worlds from the same factory, drives them with the same input
//! function, and compares state digests after every step. Both runs happen on
//! the calling thread to remove scheduling noise; cross-process or
//! cross-platform checks compare the returned final digest instead.

use crate::digest::Digest;
use crate::error::{DeterminismError, WorldError};
use crate::world::World;

/// Steps two independently built worlds in lockstep and compares digests.
///
/// `drive(step, world)` runs before each step and may apply forces, spawn or
/// remove bodies. Returns the final shared digest.
pub fn run_pair<S, D>(setup: S, steps: u64, mut drive: D) -> Result<Digest, DeterminismError>
where
    S: Fn() -> Result<World, WorldError>,
    D: FnMut(u64, &mut World),
{
    let mut a = setup()?;
    let mut b = setup()?;
    let mut digest = a.state_digest();

    for step in 0..steps {
        drive(step, &mut a);
        a.step();
        let digest_a = a.state_digest();

        drive(step, &mut b);
        b.step();
        let digest_b = b.state_digest();

        if digest_a != digest_b {
            return Err(DeterminismError::DigestMismatch {
                step,
                digest_a,
                digest_b,
            });
        }
        digest = digest_a;
    }
    Ok(digest)
}
