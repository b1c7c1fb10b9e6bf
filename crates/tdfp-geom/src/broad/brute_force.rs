// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::BTreeMap;

use tdfp_math::{Fix, Vec2};

use super::{BroadPhase, Fattening, ProxyId};
use crate::types::aabb::Aabb;

/// A minimal broad phase that checks every stored proxy on each query.
///
/// Fattening and re-insertion rules match [`super::DynamicTree`] exactly, so
/// both structures report the same pairs for the same inputs. Ids are handed
/// out monotonically and never reused.
#[derive(Debug, Clone, Default)]
pub struct BruteForce<T> {
    items: BTreeMap<ProxyId, (Aabb, T)>,
    next: usize,
    fattening: Fattening,
}

impl<T: Copy> BruteForce<T> {
    /// Creates an empty structure with the given re-insertion policy.
    pub fn new(fattening: Fattening) -> Self {
        Self {
            items: BTreeMap::new(),
            next: 0,
            fattening,
        }
    }

    /// Number of live proxies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no proxies are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Copy> BroadPhase<T> for BruteForce<T> {
    fn create_proxy(&mut self, aabb: Aabb, user_data: T, margin: Fix) -> ProxyId {
        let id = ProxyId(self.next);
        self.next += 1;
        self.items.insert(id, (aabb.expanded(margin), user_data));
        id
    }

    fn destroy_proxy(&mut self, id: ProxyId) -> Option<T> {
        self.items.remove(&id).map(|(_, data)| data)
    }

    fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        let Fattening { margin, multiplier } = self.fattening;
        match self.items.get_mut(&id) {
            Some((fat, _)) if !fat.contains(&aabb) => {
                *fat = aabb.fattened(margin, displacement, multiplier);
                true
            }
            _ => false,
        }
    }

    fn fat_aabb(&self, id: ProxyId) -> Option<Aabb> {
        self.items.get(&id).map(|(fat, _)| *fat)
    }

    fn user_data(&self, id: ProxyId) -> Option<T> {
        self.items.get(&id).map(|(_, data)| *data)
    }

    fn proxies(&self) -> Vec<ProxyId> {
        self.items.keys().copied().collect()
    }

    fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        for (id, (fat, _)) in &self.items {
            if fat.overlaps(aabb) && !callback(*id) {
                return;
            }
        }
    }
}
