mod dump;
mod split;
mod verify;

use std::collections::VecDeque;
use std::fmt;

use enum_as_inner::EnumAsInner;
use slotmap::{Key, SlotMap};
use tap::Tap;

use crate::error::TreeError;
use crate::geometry::{Bounds, Point};

/* ---------------------------------------------------------------------------------------------- */
/*                                            PARAMETER                                           */
/* ---------------------------------------------------------------------------------------------- */

/// Construction parameter of [`Tree`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeParameter {
    /// Maximum number of points a leaf, or children an internal node, holds before it splits.
    /// Must be at least 2.
    pub capacity: usize,

    /// Number of nodes to pre-allocate in the node pool.
    pub reserve: usize,
}

impl Default for TreeParameter {
    fn default() -> Self {
        Self {
            capacity: 16,
            reserve: 0,
        }
    }
}

impl TreeParameter {
    pub fn with(mut self, visit: impl FnOnce(&mut Self)) -> Self {
        visit(&mut self);
        self
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::default().tap_mut(|x| x.capacity = capacity)
    }

    fn validate(&self) -> Result<(), TreeError> {
        if self.capacity < 2 {
            return Err(TreeError::InvalidConfiguration {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/* ---------------------------------------------------------------------------------------------- */
/*                                              TREE                                              */
/* ---------------------------------------------------------------------------------------------- */

/// An R-tree over points of type `P`, partitioning space into regions of type `B`.
///
/// Every node owns a region, and the regions of siblings never overlap. When a node overflows
/// it is cut in two, and the cut is remembered in the node's pending-split queue. An ancestor
/// that overflows later reuses the oldest pending cut of one of its children (its *direct
/// child*) instead of computing a split of its own, so split planes stay consistent from the
/// leaves up.
///
/// Deletion never merges underfull nodes; an internal node whose subtree becomes empty is
/// collapsed into a single empty leaf.
pub struct Tree<P, B> {
    nodes: SlotMap<TreeNodeIndex, TreeNode<P, B>>,
    root: TreeNodeIndex,
    capacity: usize,
}

struct TreeNode<P, B> {
    parent: TreeNodeIndex,
    bound: B,
    height: usize,

    /// Number of points in this subtree.
    len: usize,

    /// Cuts made on this node which the parent didn't consume yet. Oldest first.
    splits: VecDeque<RegionSplit<B>>,

    kind: NodeKind<P>,
}

#[derive(EnumAsInner)]
enum NodeKind<P> {
    Leaf(TreeNodeLeaf<P>),
    Internal(TreeNodeInternal),
}

struct TreeNodeLeaf<P> {
    points: Vec<P>,
}

struct TreeNodeInternal {
    children: Vec<TreeNodeIndex>,

    /// Child whose pending split will be reused when this node overflows. Null if none.
    direct: TreeNodeIndex,
}

/// A region cut in two; `lo` and `hi` tile the region they were cut from.
#[derive(Debug, Clone)]
struct RegionSplit<B> {
    lo: B,
    hi: B,
}

impl<P, B> TreeNode<P, B> {
    fn new_leaf(parent: TreeNodeIndex, bound: B, points: Vec<P>) -> Self {
        Self {
            parent,
            bound,
            height: 1,
            len: points.len(),
            splits: VecDeque::new(),
            kind: NodeKind::Leaf(TreeNodeLeaf { points }),
        }
    }

    fn new_internal(
        parent: TreeNodeIndex,
        bound: B,
        height: usize,
        len: usize,
        children: Vec<TreeNodeIndex>,
    ) -> Self {
        Self {
            parent,
            bound,
            height,
            len,
            splits: VecDeque::new(),
            kind: NodeKind::Internal(TreeNodeInternal {
                children,
                direct: TreeNodeIndex::null(),
            }),
        }
    }

    /// A node is *original* while it still carries an unconsumed split.
    fn is_original(&self) -> bool {
        !self.splits.is_empty()
    }
}

/* --------------------------------------- Public Tree API -------------------------------------- */

impl<P, B> Tree<P, B>
where
    P: Point,
    B: Bounds<P> + Clone,
{
    /// Creates an empty tree covering `bound`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidConfiguration`] if `capacity < 2`.
    pub fn new(bound: B, capacity: usize) -> Result<Self, TreeError> {
        Self::with_parameter(bound, &TreeParameter::with_capacity(capacity))
    }

    /// # Errors
    ///
    /// [`TreeError::InvalidConfiguration`] if `params.capacity < 2`.
    pub fn with_parameter(bound: B, params: &TreeParameter) -> Result<Self, TreeError> {
        params.validate()?;

        let mut nodes = SlotMap::with_capacity_and_key(params.reserve);
        let root = nodes.insert(TreeNode::new_leaf(
            TreeNodeIndex::null(),
            bound,
            Vec::with_capacity(params.capacity + 1),
        ));

        Ok(Self {
            nodes,
            root,
            capacity: params.capacity,
        })
    }

    /// Number of stored points.
    pub fn count(&self) -> usize {
        self.nodes[self.root].len
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn height(&self) -> usize {
        self.nodes[self.root].height
    }

    /// Region covered by the whole tree.
    pub fn bounds(&self) -> &B {
        &self.nodes[self.root].bound
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores `point`. Returns `false`, leaving the tree untouched, if the point lies outside of
    /// the tree's region.
    pub fn insert(&mut self, point: P) -> bool {
        let Some(leaf_id) = self.find_leaf(&point) else {
            return false;
        };

        let overflow = match &mut self.nodes[leaf_id].kind {
            NodeKind::Leaf(leaf) => {
                leaf.points.push(point);
                leaf.points.len() > self.capacity
            }
            NodeKind::Internal(_) => unreachable!("descent always ends on a leaf"),
        };

        // Counts are only bumped once a leaf actually took the point.
        let mut cursor = leaf_id;
        while let Some(node) = self.nodes.get_mut(cursor) {
            node.len += 1;
            cursor = node.parent;
        }

        if overflow {
            self.split_leaf(leaf_id);
        }

        true
    }

    /// Removes the stored point with the same id as `point`. The point's coordinates are used to
    /// locate it; returns `false` if no such point is stored there.
    pub fn remove(&mut self, point: &P) -> bool {
        self.remove_recursive(self.root, point)
    }

    /// Collects every point that `region` contains.
    pub fn query(&self, region: &B) -> Vec<P>
    where
        P: Clone,
    {
        let mut result = Vec::new();
        self.query_into(region, &mut result);
        result
    }

    /// Appends every point that `region` contains to `result`, without clearing it first.
    pub fn query_into(&self, region: &B, result: &mut Vec<P>)
    where
        P: Clone,
    {
        self.query_with(region, |point| result.push(point.clone()));
    }

    /// Visits every point that `region` contains.
    pub fn query_with(&self, region: &B, mut on_query_hit: impl FnMut(&P)) {
        recurse(self, self.root, region, &mut on_query_hit);

        fn recurse<P: Point, B: Bounds<P> + Clone>(
            tree: &Tree<P, B>,
            node_id: TreeNodeIndex,
            region: &B,
            on_query_hit: &mut impl FnMut(&P),
        ) {
            let node = &tree.nodes[node_id];

            match &node.kind {
                NodeKind::Leaf(leaf) => {
                    if region.contains_bounds(&node.bound) {
                        leaf.points.iter().for_each(|p| on_query_hit(p));
                    } else if node.bound.intersects(region) {
                        leaf.points
                            .iter()
                            .filter(|p| region.contains_point(p))
                            .for_each(|p| on_query_hit(p));
                    }
                }
                NodeKind::Internal(internal) => {
                    if !region.intersects(&node.bound) {
                        return;
                    }

                    for &child in &internal.children {
                        if tree.nodes[child].bound.intersects(region) {
                            recurse(tree, child, region, on_query_hit);
                        }
                    }
                }
            }
        }
    }
}

/* ---------------------------------------- Internal APIs --------------------------------------- */

impl<P, B> Tree<P, B>
where
    P: Point,
    B: Bounds<P> + Clone,
{
    /// Descends to the leaf which should hold `point`.
    fn find_leaf(&self, point: &P) -> Option<TreeNodeIndex> {
        let mut index = self.root;

        loop {
            let node = &self.nodes[index];
            if !node.bound.contains_point(point) {
                return None;
            }

            match &node.kind {
                NodeKind::Leaf(_) => return Some(index),
                NodeKind::Internal(internal) => {
                    index = internal
                        .children
                        .iter()
                        .copied()
                        .find(|&child| self.nodes[child].bound.contains_point(point))?;
                }
            }
        }
    }

    fn children(&self, node: TreeNodeIndex) -> &[TreeNodeIndex] {
        match &self.nodes[node].kind {
            NodeKind::Internal(internal) => &internal.children,
            NodeKind::Leaf(_) => &[],
        }
    }

    fn remove_recursive(&mut self, node_id: TreeNodeIndex, point: &P) -> bool {
        let node = &mut self.nodes[node_id];
        if !node.bound.contains_point(point) {
            return false;
        }

        let removed = match &mut node.kind {
            NodeKind::Leaf(leaf) => {
                let id = point.id();
                match leaf.points.iter().position(|p| p.id() == id) {
                    Some(at) => {
                        leaf.points.swap_remove(at);
                        true
                    }
                    None => false,
                }
            }
            NodeKind::Internal(_) => {
                let mut cursor = 0;
                loop {
                    let Some(&child) = self.children(node_id).get(cursor) else {
                        break false;
                    };
                    cursor += 1;

                    if self.nodes[child].bound.contains_point(point)
                        && self.remove_recursive(child, point)
                    {
                        break true;
                    }
                }
            }
        };

        if !removed {
            return false;
        }

        let node = &mut self.nodes[node_id];
        node.len -= 1;

        if node.len == 0 && node.kind.is_internal() {
            self.condense(node_id);
        }

        true
    }

    /// Drops every child of an emptied internal node, and replaces them with one empty leaf
    /// covering the whole node.
    fn condense(&mut self, node_id: TreeNodeIndex) {
        let node = &mut self.nodes[node_id];
        let bound = node.bound.clone();
        let Some(internal) = node.kind.as_internal_mut() else {
            return;
        };

        let children = std::mem::take(&mut internal.children);
        internal.direct = TreeNodeIndex::null();

        // Fixed value; not derived from the collapsed depth.
        node.height = 2;

        for child in children {
            self.release_subtree(child);
        }

        let leaf = self.nodes.insert(TreeNode::new_leaf(
            node_id,
            bound,
            Vec::with_capacity(self.capacity + 1),
        ));

        if let Some(internal) = self.nodes[node_id].kind.as_internal_mut() {
            internal.children.push(leaf);
        }

        log::debug!("condensed emptied node {node_id:?} into leaf {leaf:?}");
    }

    fn release_subtree(&mut self, node_id: TreeNodeIndex) {
        let Some(node) = self.nodes.remove(node_id) else {
            return;
        };

        if let NodeKind::Internal(internal) = node.kind {
            for child in internal.children {
                self.release_subtree(child);
            }
        }
    }
}

impl<P, B> fmt::Debug for Tree<P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = &self.nodes[self.root];

        f.debug_struct("Tree")
            .field("count", &root.len)
            .field("height", &root.height)
            .field("capacity", &self.capacity)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(
    Tree<crate::geometry::Point2, crate::geometry::Rect2>: Send, Sync
);

/* ------------------------------------------ Id Types ------------------------------------------ */

slotmap::new_key_type! {
    /// Index of tree node
    pub struct TreeNodeIndex;
}

/* ---------------------------------------------------------------------------------------------- */
/*                                              TESTS                                             */
/* ---------------------------------------------------------------------------------------------- */
