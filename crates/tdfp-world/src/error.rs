// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types surfaced at the world API boundary.
//!
//! Numeric edge cases inside the pipeline are total and never produce these;
//! they only report rejected inputs.

use thiserror::Error;

use crate::body::BodyHandle;

/// Rejected shape definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Polygon input exceeds [`crate::shape::MAX_POLYGON_VERTICES`].
    #[error("polygon has {count} vertices; at most {max} are supported")]
    TooManyVertices {
        /// Number of points supplied.
        count: usize,
        /// Supported maximum.
        max: usize,
    },
    /// Not enough points to form the shape.
    #[error("shape needs at least {min} vertices, got {count}")]
    TooFewVertices {
        /// Number of points supplied.
        count: usize,
        /// Required minimum.
        min: usize,
    },
    /// Points are collinear or coincident, or a chain segment has zero length.
    #[error("shape is degenerate (collinear, coincident, or zero-length segment)")]
    DegenerateHull,
    /// Circle radius must be strictly positive.
    #[error("circle radius must be positive")]
    NonPositiveRadius,
}

/// Rejected world configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Time step must be strictly positive.
    #[error("time step must be positive")]
    NonPositiveTimeStep,
    /// At least one solver iteration is required.
    #[error("solver iteration count must be at least 1")]
    ZeroIterations,
    /// A margin, slop, or threshold field was negative.
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
    /// Penetration correction factor outside `[0, 1]`.
    #[error("penetration correction must lie in [0, 1]")]
    CorrectionOutOfRange,
}

/// Failure of a world API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The handle does not refer to a live body (never issued or already removed).
    #[error("invalid body handle {0}")]
    InvalidHandle(BodyHandle),
    /// Every `u32` slot index is in use.
    #[error("body capacity exhausted")]
    CapacityExhausted,
    /// Shape rejected.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Determinism check failure.
#[derive(Debug, Error)]
pub enum DeterminismError {
    /// State digests diverged at a given step between two worlds.
    #[error("determinism mismatch at step {step}: {digest_a:?} vs {digest_b:?}")]
    DigestMismatch {
        /// Step index where divergence was detected.
        step: u64,
        /// Digest of the first world.
        digest_a: [u8; 32],
        /// Digest of the second world.
        digest_b: [u8; 32],
    },
    /// Building one of the worlds failed.
    #[error("failed to build world: {0}")]
    Setup(#[from] WorldError),
}
