// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! tdfp developer CLI.
//!
//! Subcommands
//! - `run <scene> --steps N`: simulate and print every body plus the digest.
//! - `record <scene> --steps N --out golden.json`: write per-step digests.
//! - `verify <scene> --steps N [--golden golden.json]`: lockstep pair check,
//!   optionally replayed against a recorded golden file.
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG=debug` for
//! per-contact output.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tdfp_cli::{commands, SceneFile};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tdfp-cli", version, about = "Deterministic 2D physics scene runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scene and print final body states and the state digest
    Run {
        /// Path to a JSON scene
        scene: PathBuf,
        /// Number of fixed steps
        #[arg(long, default_value_t = 60)]
        steps: u64,
        /// Emit the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Record the digest after every step into a golden file
    Record {
        /// Path to a JSON scene
        scene: PathBuf,
        /// Number of fixed steps
        #[arg(long, default_value_t = 60)]
        steps: u64,
        /// Output path for the golden JSON
        #[arg(long)]
        out: PathBuf,
    },
    /// Step two copies in lockstep and compare digests every step
    Verify {
        /// Path to a JSON scene
        scene: PathBuf,
        /// Number of fixed steps
        #[arg(long, default_value_t = 60)]
        steps: u64,
        /// Also replay against a recorded golden file
        #[arg(long)]
        golden: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Run { scene, steps, json } => {
            let summary = commands::run(&SceneFile::load(&scene)?, steps)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &summary)?;
                writeln!(out)?;
            } else {
                writeln!(out, "tick {}  events {}", summary.tick, summary.events)?;
                for b in &summary.bodies {
                    writeln!(
                        out,
                        "body#{}v{}  pos ({:.5}, {:.5})  angle {:.5}  vel ({:.5}, {:.5})  omega {:.5}",
                        b.index,
                        b.generation,
                        b.position[0],
                        b.position[1],
                        b.angle,
                        b.velocity[0],
                        b.velocity[1],
                        b.angular_velocity,
                    )?;
                }
                writeln!(out, "digest {}", summary.digest)?;
            }
        }
        Command::Record { scene, steps, out: path } => {
            let golden = commands::record(&SceneFile::load(&scene)?, steps)?;
            golden.save(&path)?;
            writeln!(out, "recorded {} steps to {}", golden.digests_hex.len(), path.display())?;
        }
        Command::Verify {
            scene,
            steps,
            golden,
        } => {
            let scene = SceneFile::load(&scene)?;
            let digest = commands::verify(&scene, steps)?;
            writeln!(out, "lockstep OK: {steps} steps, digest {digest}")?;
            if let Some(path) = golden {
                let golden = commands::Golden::load(&path)?;
                commands::check_golden(&scene, &golden)?;
                writeln!(out, "golden OK: {} steps", golden.digests_hex.len())?;
            }
        }
    }
    Ok(())
}
