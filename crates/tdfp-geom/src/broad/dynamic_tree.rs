// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic AABB tree (incremental BVH) over fattened proxies.
//!
//! Nodes live in a flat pool with an embedded free list; indices replace
//! pointers and [`NULL_NODE`] marks "no node". Leaves hold the proxies.
//! Internal nodes always have two children and bound their union.
//!
//! - Insertion picks a sibling by branch-and-bound over the perimeter cost.
//! - Every ancestor walked after an insert or remove is rebalanced with an
//!   AVL-style rotation and refitted.
//! - [`DynamicTree::move_proxy`] is a no-op while the tight box still fits
//!   inside the stored fat box.

use thiserror::Error;

use tdfp_math::{Fix, Vec2};

use super::{BroadPhase, Fattening, ProxyId};
use crate::types::aabb::Aabb;
use crate::types::ray::RayCastInput;

/// Sentinel index meaning "no node".
pub const NULL_NODE: usize = usize::MAX;

const INITIAL_CAPACITY: usize = 16;

/// Structural defect found by [`DynamicTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The root node has a parent link.
    #[error("root node {node} has a parent")]
    RootHasParent {
        /// Offending node index.
        node: usize,
    },
    /// A child does not point back at its parent.
    #[error("node {node} does not point back at parent {parent}")]
    ParentMismatch {
        /// Child node index.
        node: usize,
        /// Expected parent index.
        parent: usize,
    },
    /// A node reachable from the root is in the free pool.
    #[error("node {node} is reachable from the root but marked free")]
    FreeNodeInTree {
        /// Offending node index.
        node: usize,
    },
    /// A leaf is missing its payload or has a non-zero height.
    #[error("leaf {node} is malformed")]
    MalformedLeaf {
        /// Offending node index.
        node: usize,
    },
    /// Internal node height is not `1 + max(child heights)`.
    #[error("node {node} height {found}, expected {expected}")]
    HeightMismatch {
        /// Offending node index.
        node: usize,
        /// Height derived from the children.
        expected: i32,
        /// Stored height.
        found: i32,
    },
    /// Internal node AABB is not the union of its children.
    #[error("node {node} bounds are not the union of its children")]
    BoundsMismatch {
        /// Offending node index.
        node: usize,
    },
    /// The free list and the reachable nodes do not partition the pool.
    #[error("node accounting mismatch: {reachable} reachable + {free} free != {capacity}")]
    CountMismatch {
        /// Nodes reachable from the root.
        reachable: usize,
        /// Nodes on the free list.
        free: usize,
        /// Pool size.
        capacity: usize,
    },
}

#[derive(Debug, Clone)]
struct TreeNode<T> {
    aabb: Aabb,
    user_data: Option<T>,
    parent: usize,
    left: usize,
    right: usize,
    /// 0 for leaves, -1 while pooled.
    height: i32,
    next: usize,
}

impl<T> TreeNode<T> {
    fn pooled(next: usize) -> Self {
        Self {
            aabb: Aabb::default(),
            user_data: None,
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: -1,
            next,
        }
    }

    const fn is_leaf(&self) -> bool {
        self.left == NULL_NODE
    }
}

/// Dynamic AABB tree generic over the leaf payload.
#[derive(Debug, Clone)]
pub struct DynamicTree<T> {
    nodes: Vec<TreeNode<T>>,
    root: usize,
    free_list: usize,
    node_count: usize,
    proxy_count: usize,
    fattening: Fattening,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new(Fattening::default())
    }
}

impl<T: Copy> DynamicTree<T> {
    /// Creates an empty tree with a pre-linked pool of 16 nodes.
    pub fn new(fattening: Fattening) -> Self {
        let nodes = (0..INITIAL_CAPACITY)
            .map(|i| TreeNode::pooled(if i + 1 < INITIAL_CAPACITY { i + 1 } else { NULL_NODE }))
            .collect();
        Self {
            nodes,
            root: NULL_NODE,
            free_list: 0,
            node_count: 0,
            proxy_count: 0,
            fattening,
        }
    }

    /// Re-insertion policy used by [`DynamicTree::move_proxy`].
    pub const fn fattening(&self) -> Fattening {
        self.fattening
    }

    /// Number of allocated nodes (leaves and internal).
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live proxies (leaves).
    pub const fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    /// Size of the node pool, free nodes included.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Height of the root, `0` for an empty tree or a single leaf.
    pub fn height(&self) -> i32 {
        self.live(self.root).map_or(0, |n| n.height)
    }

    /// Root index, or [`NULL_NODE`] when empty.
    pub const fn root(&self) -> usize {
        self.root
    }

    fn live(&self, index: usize) -> Option<&TreeNode<T>> {
        self.nodes.get(index).filter(|n| n.height >= 0)
    }

    fn leaf(&self, id: ProxyId) -> Option<&TreeNode<T>> {
        self.live(id.0).filter(|n| n.is_leaf())
    }

    fn allocate_node(&mut self) -> usize {
        if self.free_list == NULL_NODE {
            let old = self.nodes.len();
            let grown = (old * 2).max(INITIAL_CAPACITY);
            self.nodes.extend((old..grown).map(|i| {
                TreeNode::pooled(if i + 1 < grown { i + 1 } else { NULL_NODE })
            }));
            self.free_list = old;
        }
        let id = self.free_list;
        let node = &mut self.nodes[id];
        self.free_list = node.next;
        node.parent = NULL_NODE;
        node.left = NULL_NODE;
        node.right = NULL_NODE;
        node.height = 0;
        node.user_data = None;
        node.next = NULL_NODE;
        self.node_count += 1;
        id
    }

    fn free_node(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        node.next = self.free_list;
        node.height = -1;
        node.user_data = None;
        self.free_list = index;
        self.node_count -= 1;
    }

    /// Creates a leaf for `aabb` fattened by `margin` and returns its id.
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T, margin: Fix) -> ProxyId {
        let id = self.allocate_node();
        let node = &mut self.nodes[id];
        node.aabb = aabb.expanded(margin);
        node.user_data = Some(user_data);
        node.height = 0;
        self.insert_leaf(id);
        self.proxy_count += 1;
        ProxyId(id)
    }

    /// Removes a leaf, returning its payload. Unknown ids are ignored.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> Option<T> {
        let data = self.leaf(id)?.user_data;
        self.remove_leaf(id.0);
        self.free_node(id.0);
        self.proxy_count -= 1;
        data
    }

    /// Moves a proxy whose tight box is now `aabb`.
    ///
    /// While `aabb` still fits in the stored fat box nothing changes and this
    /// returns `false`. Otherwise the leaf is re-inserted with a box fattened
    /// by the tree's margin and stretched by `multiplier * displacement`.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        let Some(node) = self.leaf(id) else {
            return false;
        };
        if node.aabb.contains(&aabb) {
            return false;
        }
        self.remove_leaf(id.0);
        let Fattening { margin, multiplier } = self.fattening;
        self.nodes[id.0].aabb = aabb.fattened(margin, displacement, multiplier);
        self.insert_leaf(id.0);
        true
    }

    /// Fat AABB stored for a proxy.
    pub fn fat_aabb(&self, id: ProxyId) -> Option<Aabb> {
        self.leaf(id).map(|n| n.aabb)
    }

    /// Payload stored for a proxy.
    pub fn user_data(&self, id: ProxyId) -> Option<T> {
        self.leaf(id).and_then(|n| n.user_data)
    }

    /// Visits every leaf whose fat AABB overlaps `aabb` until `callback`
    /// returns `false`.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let Some(node) = self.live(index) else {
                continue;
            };
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            if node.is_leaf() {
                if !callback(ProxyId(index)) {
                    return;
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Casts a segment through the tree.
    ///
    /// `callback` receives the input clipped to the current max fraction and
    /// a candidate proxy, and answers with:
    /// - `0` to terminate the cast,
    /// - a fraction in `(0, 1]` to clip the segment (return the input's
    ///   `max_fraction` to continue unchanged),
    /// - a negative value to ignore the proxy.
    pub fn raycast<F>(&self, input: &RayCastInput, mut callback: F)
    where
        F: FnMut(&RayCastInput, ProxyId) -> Fix,
    {
        let p1 = input.p1;
        let delta = input.p2 - p1;
        let dir = delta.normalize();
        if dir == Vec2::ZERO {
            return;
        }
        // Separating axis perpendicular to the segment.
        let v = Vec2::cross_sv(Fix::ONE, dir);
        let abs_v = v.abs();
        let mut max_fraction = input.max_fraction;
        let mut segment = Aabb::new(p1, p1 + delta * max_fraction);

        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let Some(node) = self.live(index) else {
                continue;
            };
            if !node.aabb.overlaps(&segment) {
                continue;
            }
            let separation =
                v.dot(p1 - node.aabb.center()).abs() - abs_v.dot(node.aabb.extents());
            if separation.is_positive() {
                continue;
            }
            if node.is_leaf() {
                let clipped = RayCastInput {
                    p1,
                    p2: input.p2,
                    max_fraction,
                };
                let value = callback(&clipped, ProxyId(index));
                if value.is_zero() {
                    return;
                }
                if value.is_positive() {
                    max_fraction = value;
                    segment = Aabb::new(p1, p1 + delta * max_fraction);
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Translates every stored box by `-new_origin`.
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        for node in self.nodes.iter_mut().filter(|n| n.height >= 0) {
            node.aabb = node.aabb.translated(-new_origin);
        }
    }

    /// Sum of internal-node perimeters; lower is a tighter tree.
    ///
    /// Insertion cost is measured by perimeter rather than box area, so these
    /// values are not comparable with area-based tree costs. Perimeter grows
    /// linearly with extent and stays inside the Q16.16 range for boxes whose
    /// area would saturate.
    pub fn compute_cost(&self) -> Fix {
        self.nodes
            .iter()
            .filter(|n| n.height > 0)
            .map(|n| n.aabb.perimeter())
            .sum()
    }

    /// Largest child-height difference over all internal nodes.
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|n| n.height > 1)
            .map(|n| (self.nodes[n.right].height - self.nodes[n.left].height).abs())
            .max()
            .unwrap_or(0)
    }

    /// Checks every structural invariant: parent links, leaf shape, heights,
    /// bounds, and the free list partitioning the pool.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut reachable = 0;
        if self.root != NULL_NODE {
            if self.nodes[self.root].parent != NULL_NODE {
                return Err(TreeError::RootHasParent { node: self.root });
            }
            let mut stack = vec![self.root];
            while let Some(index) = stack.pop() {
                reachable += 1;
                let node = self
                    .live(index)
                    .ok_or(TreeError::FreeNodeInTree { node: index })?;
                if node.is_leaf() {
                    if node.height != 0 || node.user_data.is_none() || node.right != NULL_NODE {
                        return Err(TreeError::MalformedLeaf { node: index });
                    }
                    continue;
                }
                let (left, right) = (node.left, node.right);
                for child in [left, right] {
                    let child_node = self
                        .live(child)
                        .ok_or(TreeError::FreeNodeInTree { node: child })?;
                    if child_node.parent != index {
                        return Err(TreeError::ParentMismatch {
                            node: child,
                            parent: index,
                        });
                    }
                }
                let (l, r) = (&self.nodes[left], &self.nodes[right]);
                let expected = 1 + l.height.max(r.height);
                if node.height != expected {
                    return Err(TreeError::HeightMismatch {
                        node: index,
                        expected,
                        found: node.height,
                    });
                }
                if node.aabb != l.aabb.union(&r.aabb) {
                    return Err(TreeError::BoundsMismatch { node: index });
                }
                stack.push(left);
                stack.push(right);
            }
        }

        let mut free = 0;
        let mut cursor = self.free_list;
        while cursor != NULL_NODE && free <= self.nodes.len() {
            free += 1;
            cursor = self.nodes[cursor].next;
        }
        if reachable != self.node_count || reachable + free != self.nodes.len() {
            return Err(TreeError::CountMismatch {
                reachable,
                free,
                capacity: self.nodes.len(),
            });
        }
        Ok(())
    }

    fn insert_leaf(&mut self, leaf: usize) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf].parent = NULL_NODE;
            return;
        }

        let leaf_aabb = self.nodes[leaf].aabb;
        let sibling = self.pick_best_sibling(&leaf_aabb);

        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.allocate_node();
        {
            let sibling_node = &self.nodes[sibling];
            let aabb = leaf_aabb.union(&sibling_node.aabb);
            let height = sibling_node.height + 1;
            let parent = &mut self.nodes[new_parent];
            parent.parent = old_parent;
            parent.aabb = aabb;
            parent.height = height;
            parent.left = sibling;
            parent.right = leaf;
        }
        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else {
            self.replace_child(old_parent, sibling, new_parent);
        }
        self.nodes[sibling].parent = new_parent;
        self.nodes[leaf].parent = new_parent;

        self.refit_upward(new_parent);
    }

    fn remove_leaf(&mut self, leaf: usize) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf].parent;
        let grand_parent = self.nodes[parent].parent;
        let sibling = if self.nodes[parent].left == leaf {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        };

        if grand_parent == NULL_NODE {
            self.root = sibling;
            self.nodes[sibling].parent = NULL_NODE;
            self.free_node(parent);
        } else {
            self.replace_child(grand_parent, parent, sibling);
            self.nodes[sibling].parent = grand_parent;
            self.free_node(parent);
            self.refit_upward(grand_parent);
        }
        self.nodes[leaf].parent = NULL_NODE;
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        let node = &mut self.nodes[parent];
        if node.left == old {
            node.left = new;
        } else {
            node.right = new;
        }
    }

    fn refit(&mut self, index: usize) {
        let (left, right) = (self.nodes[index].left, self.nodes[index].right);
        let aabb = self.nodes[left].aabb.union(&self.nodes[right].aabb);
        let height = 1 + self.nodes[left].height.max(self.nodes[right].height);
        let node = &mut self.nodes[index];
        node.aabb = aabb;
        node.height = height;
    }

    fn refit_upward(&mut self, start: usize) {
        let mut index = start;
        while index != NULL_NODE {
            index = self.balance(index);
            self.refit(index);
            index = self.nodes[index].parent;
        }
    }

    /// Branch-and-bound descent over perimeter cost, used in place of area
    /// (see [`Self::compute_cost`]). Ties favour making a new sibling at the
    /// current level.
    fn pick_best_sibling(&self, leaf_aabb: &Aabb) -> usize {
        let mut index = self.root;
        let mut inherited = Fix::ZERO;
        while !self.nodes[index].is_leaf() {
            let node = &self.nodes[index];
            let perimeter = node.aabb.perimeter();
            let combined = node.aabb.union(leaf_aabb).perimeter();

            // Cost of pairing the leaf with this node under a new parent.
            let cost = combined * 2 + inherited;
            // Lower bound on pushing the leaf further down.
            let descend = inherited + (combined - perimeter) * 2;

            let child_cost = |child: usize| {
                let child_node = &self.nodes[child];
                let union = leaf_aabb.union(&child_node.aabb).perimeter();
                if child_node.is_leaf() {
                    union + descend
                } else {
                    union - child_node.aabb.perimeter() + descend
                }
            };
            let cost_left = child_cost(node.left);
            let cost_right = child_cost(node.right);

            if cost <= cost_left && cost <= cost_right {
                break;
            }
            inherited = descend;
            index = if cost_left < cost_right {
                node.left
            } else {
                node.right
            };
        }
        index
    }

    /// Rotates `a` if its children's heights differ by more than one and
    /// returns the index now occupying `a`'s position.
    fn balance(&mut self, a: usize) -> usize {
        let node = &self.nodes[a];
        if node.is_leaf() || node.height < 2 {
            return a;
        }
        let (left, right) = (node.left, node.right);
        let balance = self.nodes[right].height - self.nodes[left].height;
        if balance > 1 {
            self.rotate_up(a, right, left, Side::Right)
        } else if balance < -1 {
            self.rotate_up(a, left, right, Side::Left)
        } else {
            a
        }
    }

    /// Lifts child `up` (on `side` of `a`) into `a`'s place. `a` becomes the
    /// left child of `up` and adopts one of `up`'s children on `side`.
    fn rotate_up(&mut self, a: usize, up: usize, other: usize, side: Side) -> usize {
        let (f, g) = (self.nodes[up].left, self.nodes[up].right);
        let (keep, give) = self.choose_grandchild(f, g, other);

        let parent = self.nodes[a].parent;
        {
            let up_node = &mut self.nodes[up];
            up_node.parent = parent;
            up_node.left = a;
            up_node.right = keep;
        }
        if parent == NULL_NODE {
            self.root = up;
        } else {
            self.replace_child(parent, a, up);
        }

        let a_node = &mut self.nodes[a];
        a_node.parent = up;
        match side {
            Side::Left => a_node.left = give,
            Side::Right => a_node.right = give,
        }
        self.nodes[give].parent = a;
        self.nodes[keep].parent = up;

        self.refit(a);
        self.refit(up);
        up
    }

    /// Returns `(keep, give)`: the taller grandchild stays under the lifted
    /// node; on equal heights the one yielding the smaller box for `a` is given.
    fn choose_grandchild(&self, f: usize, g: usize, other: usize) -> (usize, usize) {
        let (hf, hg) = (self.nodes[f].height, self.nodes[g].height);
        if hf > hg {
            return (f, g);
        }
        if hg > hf {
            return (g, f);
        }
        let other_aabb = self.nodes[other].aabb;
        let give_f = other_aabb.union(&self.nodes[f].aabb).perimeter();
        let give_g = other_aabb.union(&self.nodes[g].aabb).perimeter();
        if give_g < give_f {
            (f, g)
        } else {
            (g, f)
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl<T: Copy> BroadPhase<T> for DynamicTree<T> {
    fn create_proxy(&mut self, aabb: Aabb, user_data: T, margin: Fix) -> ProxyId {
        Self::create_proxy(self, aabb, user_data, margin)
    }

    fn destroy_proxy(&mut self, id: ProxyId) -> Option<T> {
        Self::destroy_proxy(self, id)
    }

    fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        Self::move_proxy(self, id, aabb, displacement)
    }

    fn fat_aabb(&self, id: ProxyId) -> Option<Aabb> {
        Self::fat_aabb(self, id)
    }

    fn user_data(&self, id: ProxyId) -> Option<T> {
        Self::user_data(self, id)
    }

    fn proxies(&self) -> Vec<ProxyId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.height == 0 && n.user_data.is_some())
            .map(|(i, _)| ProxyId(i))
            .collect()
    }

    fn query<F>(&self, aabb: &Aabb, callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        Self::query(self, aabb, callback);
    }
}
