// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces and implementations.
//!
//! Determinism contract (applies to all implementations used here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).
//!
//! [`DynamicTree`] is the production structure. [`BruteForce`] is an `O(n^2)`
//! baseline with identical fattening and pairing semantics, kept as an oracle
//! for tests and benchmarks.

use core::fmt;

use tdfp_math::{Fix, Vec2};

use crate::types::aabb::Aabb;

#[doc = "All-pairs reference broad phase."]
pub mod brute_force;
#[doc = "Dynamic AABB tree (incremental BVH)."]
pub mod dynamic_tree;

pub use brute_force::BruteForce;
pub use dynamic_tree::{DynamicTree, TreeError, NULL_NODE};

/// Handle for one proxy (fattened AABB) stored in a broad phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(pub(crate) usize);

impl ProxyId {
    /// Slot index inside the owning structure.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proxy#{}", self.0)
    }
}

/// How proxies are fattened when they are re-inserted after moving.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fattening {
    /// Uniform margin added on every side of the tight AABB.
    pub margin: Fix,
    /// Scale applied to the frame displacement when stretching the fat AABB.
    pub multiplier: Fix,
}

impl Default for Fattening {
    fn default() -> Self {
        Self {
            margin: Fix::from_ratio(1, 5),
            multiplier: Fix::ONE,
        }
    }
}

/// Broad-phase interface for proxy storage and overlap queries.
///
/// Implementations must return pairs deterministically: the pair `(a, b)` is
/// canonicalized such that `a < b`, and the full list is sorted ascending by
/// `(a, b)`.
pub trait BroadPhase<T: Copy> {
    /// Inserts a proxy for `aabb`, fattened by `margin`.
    fn create_proxy(&mut self, aabb: Aabb, user_data: T, margin: Fix) -> ProxyId;
    /// Removes a proxy, returning its payload. Unknown ids return `None`.
    fn destroy_proxy(&mut self, id: ProxyId) -> Option<T>;
    /// Updates a proxy after its owner moved by `displacement`.
    ///
    /// Returns `true` only if the proxy had to be re-inserted because `aabb`
    /// escaped its current fat AABB.
    fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool;
    /// Fat AABB currently stored for `id`.
    fn fat_aabb(&self, id: ProxyId) -> Option<Aabb>;
    /// Payload stored for `id`.
    fn user_data(&self, id: ProxyId) -> Option<T>;
    /// Every live proxy id in ascending order.
    fn proxies(&self) -> Vec<ProxyId>;
    /// Visits every proxy whose fat AABB overlaps `aabb` until `callback`
    /// returns `false`.
    fn query<F>(&self, aabb: &Aabb, callback: F)
    where
        F: FnMut(ProxyId) -> bool;

    /// Returns a canonical, deterministically-ordered list of overlapping pairs.
    fn pairs(&self) -> Vec<(ProxyId, ProxyId)> {
        let mut out = Vec::new();
        for id in self.proxies() {
            let Some(fat) = self.fat_aabb(id) else {
                continue;
            };
            self.query(&fat, |other| {
                if id < other {
                    out.push((id, other));
                }
                true
            });
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}
