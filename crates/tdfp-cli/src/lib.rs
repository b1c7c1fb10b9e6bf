// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
//! Library half of `tdfp-cli`: scene loading and the command bodies, kept
//! separate from argument parsing so they can be tested directly.

pub mod commands;
pub mod scene;

pub use commands::{BodyState, Golden, RunSummary};
pub use scene::SceneFile;
