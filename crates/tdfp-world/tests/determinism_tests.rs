// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used)]
//! Lockstep replays must agree bit for bit.

use tdfp_math::{Fix, Vec2};
use tdfp_world::determinism::run_pair;
use tdfp_world::{
    digest_hex, BodyDef, BodyHandle, Circle, EdgeChain, ForceMode, Polygon, World, WorldConfig,
    WorldError,
};

fn mixed_scene() -> Result<World, WorldError> {
    let mut world = World::new(WorldConfig {
        iterations: 4,
        ..WorldConfig::default()
    })?;
    let ramp = EdgeChain::new(&[
        Vec2::from_ints(-12, 6),
        Vec2::from_ints(-4, 0),
        Vec2::from_ints(12, 0),
    ])?;
    world.add_body(BodyDef::new(ramp))?;
    world.add_body(
        BodyDef::new(Polygon::rect(Fix::from_int(4), Fix::HALF)?).at(Vec2::from_ints(6, -3)),
    )?;
    for i in 0..6 {
        let x = Fix::from_ratio(i * 3 - 8, 2);
        world.add_body(
            BodyDef::new(Circle::new(Fix::from_ratio(2 + i % 3, 8))?)
                .with_density(Fix::ONE)
                .at(Vec2::new(x, Fix::from_int(4 + i))),
        )?;
        world.add_body(
            BodyDef::new(Polygon::rect(Fix::from_ratio(1, 3), Fix::from_ratio(1, 4))?)
                .with_density(Fix::TWO)
                .with_angle(Fix::from_ratio(i, 5))
                .at(Vec2::new(x + Fix::ONE, Fix::from_int(8 + i))),
        )?;
    }
    Ok(world)
}

fn handle_at(world: &World, nth: usize) -> Option<BodyHandle> {
    world.bodies().nth(nth).map(|b| b.handle())
}

fn drive(step: u64, world: &mut World) {
    if step % 30 == 0 {
        if let Some(h) = handle_at(world, 3) {
            let _ = world.add_force(h, Vec2::from_ints(1, 2), ForceMode::Impulse);
        }
    }
    if step == 100 {
        if let Some(h) = handle_at(world, 5) {
            let _ = world.remove_body(h);
        }
    }
    if step == 120 {
        if let Ok(c) = Circle::new(Fix::HALF) {
            let _ = world.add_body(
                BodyDef::new(c)
                    .with_density(Fix::ONE)
                    .at(Vec2::from_ints(2, 10)),
            );
        }
    }
}

#[test]
fn lockstep_worlds_agree_every_step() {
    let digest = run_pair(mixed_scene, 240, drive).expect("identical runs");
    assert_eq!(digest_hex(&digest).len(), 64);
}

#[test]
fn repeated_runs_reproduce_the_final_digest() {
    let first = run_pair(mixed_scene, 120, drive).expect("run");
    let second = run_pair(mixed_scene, 120, drive).expect("run");
    assert_eq!(first, second);

    let mut solo = mixed_scene().expect("scene");
    for step in 0..120 {
        drive(step, &mut solo);
        solo.step();
    }
    assert_eq!(solo.state_digest(), first);
}

#[test]
fn digest_tracks_state_changes() {
    let mut world = mixed_scene().expect("scene");
    let start = world.state_digest();
    world.step();
    let stepped = world.state_digest();
    assert_ne!(start, stepped);

    let h = handle_at(&world, 2).expect("body");
    let mut nudged = world.clone();
    nudged
        .set_linear_velocity(h, Vec2::from_ints(0, 1))
        .expect("live");
    assert_ne!(nudged.state_digest(), stepped);
    assert_eq!(world.state_digest(), stepped);
}

#[test]
fn clones_diverge_only_when_inputs_do() {
    let mut a = mixed_scene().expect("scene");
    for _ in 0..30 {
        a.step();
    }
    let mut b = a.clone();
    for _ in 0..30 {
        a.step();
        b.step();
    }
    assert_eq!(a.state_digest(), b.state_digest());

    let h = handle_at(&b, 4).expect("body");
    b.add_force(h, Vec2::from_ints(0, 5), ForceMode::Impulse)
        .expect("live");
    a.step();
    b.step();
    assert_ne!(a.state_digest(), b.state_digest());
}
