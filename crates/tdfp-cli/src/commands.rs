// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene runs, digest recording, and determinism checks.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tdfp_world::determinism::run_pair;
use tdfp_world::{digest_hex, RigidBody, World};
use tracing::{debug, info};

use crate::scene::SceneFile;

/// Hash algorithm tag written into golden files.
pub const HASH_ALG: &str = "BLAKE3";

/// Final pose of one body, in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyState {
    /// Slot index of the body handle.
    pub index: u32,
    /// Generation of the body handle.
    pub generation: u32,
    /// Position.
    pub position: [f64; 2],
    /// Rotation in radians.
    pub angle: f64,
    /// Linear velocity.
    pub velocity: [f64; 2],
    /// Angular velocity.
    pub angular_velocity: f64,
}

impl From<&RigidBody> for BodyState {
    fn from(body: &RigidBody) -> Self {
        let p = body.position();
        let v = body.linear_velocity();
        Self {
            index: body.handle().index(),
            generation: body.handle().generation(),
            position: [p.x.to_f64(), p.y.to_f64()],
            angle: body.angle().to_f64(),
            velocity: [v.x.to_f64(), v.y.to_f64()],
            angular_velocity: body.angular_velocity().to_f64(),
        }
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Ticks simulated.
    pub tick: u64,
    /// Contact events emitted across the whole run.
    pub events: usize,
    /// Hex state digest after the last step.
    pub digest: String,
    /// Every live body in handle order.
    pub bodies: Vec<BodyState>,
}

/// Per-step digests of a scene run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Golden {
    /// Hash algorithm tag; always [`HASH_ALG`].
    pub hash_alg: String,
    /// Digest after each step, hex encoded.
    pub digests_hex: Vec<String>,
}

impl Golden {
    /// Reads a golden file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open golden file {}", path.display()))?;
        let golden: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse golden file {}", path.display()))?;
        if golden.hash_alg != HASH_ALG {
            bail!("unsupported hash algorithm {:?}", golden.hash_alg);
        }
        Ok(golden)
    }

    /// Writes the golden file as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create golden file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

fn build(scene: &SceneFile) -> Result<World> {
    scene.build().context("failed to build world from scene")
}

/// Steps a scene `steps` times and summarizes the final state.
pub fn run(scene: &SceneFile, steps: u64) -> Result<RunSummary> {
    let mut world = build(scene)?;
    let mut events = 0;
    for _ in 0..steps {
        let report = world.step();
        events += report.events.len();
        for event in &report.events {
            debug!(
                tick = report.tick,
                body = %event.body,
                other = %event.other,
                kind = ?event.kind,
                phase = ?event.phase,
                "contact"
            );
        }
    }
    let digest = digest_hex(&world.state_digest());
    info!(steps, events, digest = %digest, "run complete");
    Ok(RunSummary {
        tick: world.tick(),
        events,
        digest,
        bodies: world.bodies().map(BodyState::from).collect(),
    })
}

/// Steps a scene and collects the digest after every step.
pub fn record(scene: &SceneFile, steps: u64) -> Result<Golden> {
    let mut world = build(scene)?;
    let digests_hex = (0..steps)
        .map(|_| {
            world.step();
            digest_hex(&world.state_digest())
        })
        .collect();
    Ok(Golden {
        hash_alg: HASH_ALG.to_owned(),
        digests_hex,
    })
}

/// Runs two lockstep copies of the scene and returns the shared final digest.
pub fn verify(scene: &SceneFile, steps: u64) -> Result<String> {
    let digest = run_pair(|| scene.build(), steps, |_, _| {})?;
    Ok(digest_hex(&digest))
}

/// First step at which two digest sequences disagree, including a length
/// mismatch (reported at the shorter length).
pub fn first_divergence(expected: &[String], actual: &[String]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then_some(expected.len().min(actual.len())))
}

/// Replays a scene and compares against a recorded golden sequence.
pub fn check_golden(scene: &SceneFile, golden: &Golden) -> Result<()> {
    let steps = u64::try_from(golden.digests_hex.len()).context("golden file too long")?;
    let actual = record(scene, steps)?;
    if let Some(step) = first_divergence(&golden.digests_hex, &actual.digests_hex) {
        let expected = golden.digests_hex.get(step).map_or("<none>", String::as_str);
        let found = actual.digests_hex.get(step).map_or("<none>", String::as_str);
        bail!("digest mismatch at step {step}\nexpected: {expected}\nactual:   {found}");
    }
    Ok(())
}
