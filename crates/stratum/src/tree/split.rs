//! Node splitting, and propagation of split planes toward the root.

use slotmap::Key;

use super::*;
use crate::primitive::AxisIndex;

impl<P, B> Tree<P, B>
where
    P: Point,
    B: Bounds<P> + Clone,
{
    /// Cuts an overflowing leaf in two at the median of the axis whose median lies closest to the
    /// center of the leaf's region.
    pub(super) fn split_leaf(&mut self, node_id: TreeNodeIndex) {
        let capacity = self.capacity;
        let TreeNode {
            bound,
            len,
            parent,
            kind: NodeKind::Leaf(leaf),
            ..
        } = &mut self.nodes[node_id]
        else {
            unreachable!("only leaves are split by points")
        };

        let Some((axis, fraction)) = select_split_plane(bound, &mut leaf.points) else {
            log::trace!("leaf {node_id:?} has no usable split plane; left overfull");
            return;
        };

        let (lo, hi) = bound.split(fraction, axis);

        let mut moved = Vec::with_capacity(capacity + 1);
        let mut cursor = 0;
        while cursor < leaf.points.len() {
            if hi.contains_point(&leaf.points[cursor]) {
                moved.push(leaf.points.swap_remove(cursor));
            } else {
                cursor += 1;
            }
        }

        log::trace!(
            "leaf {node_id:?} split on axis {axis} at {fraction:.4}; {} stay, {} move",
            leaf.points.len(),
            moved.len()
        );

        *len -= moved.len();
        let whole = std::mem::replace(bound, lo.clone());
        let sibling = TreeNode::new_leaf(*parent, hi.clone(), moved);

        self.nodes[node_id]
            .splits
            .push_back(RegionSplit { lo, hi });

        let sibling = self.nodes.insert(sibling);
        self.attach_sibling(node_id, sibling, whole);
    }

    /// Cuts an overflowing internal node in two, reusing the oldest pending split of its direct
    /// child. Deferred until the next attach if no child offers a split that separates this
    /// node's children.
    fn split_internal(&mut self, node_id: TreeNodeIndex) {
        let Some(split) = self.take_child_split(node_id) else {
            log::debug!(
                "internal node {node_id:?} overflows without a usable split plane; deferred"
            );
            return;
        };

        let (children, whole, height, parent) = {
            let node = &mut self.nodes[node_id];
            let whole = std::mem::replace(&mut node.bound, split.lo.clone());
            let Some(internal) = node.kind.as_internal_mut() else {
                return;
            };

            (
                std::mem::take(&mut internal.children),
                whole,
                node.height,
                node.parent,
            )
        };

        let (moved, kept): (Vec<_>, Vec<_>) = children
            .into_iter()
            .partition(|&child| split.hi.contains_bounds(&self.nodes[child].bound));

        let moved_len: usize = moved.iter().map(|&child| self.nodes[child].len).sum();
        let sibling = self.nodes.insert(TreeNode::new_internal(
            parent,
            split.hi.clone(),
            height,
            moved_len,
            Vec::with_capacity(self.capacity + 1),
        ));

        for &child in &moved {
            self.nodes[child].parent = sibling;
        }

        log::debug!(
            "internal node {node_id:?} split at height {height}; {} stay, {} move",
            kept.len(),
            moved.len()
        );

        if let Some(internal) = self.nodes[sibling].kind.as_internal_mut() {
            internal.children = moved;
        }

        let node = &mut self.nodes[node_id];
        node.len -= moved_len;
        if let Some(internal) = node.kind.as_internal_mut() {
            if !kept.contains(&internal.direct) {
                internal.direct = TreeNodeIndex::null();
            }
            internal.children = kept;
        }

        self.find_direct_child(node_id);
        self.find_direct_child(sibling);

        self.nodes[node_id].splits.push_back(split);
        self.attach_sibling(node_id, sibling, whole);
    }

    /// Hands a freshly cut-off sibling to the parent of `node_id`, growing a new root if the split
    /// node was the root. `whole` is the region `node_id` covered before the cut.
    fn attach_sibling(&mut self, node_id: TreeNodeIndex, sibling: TreeNodeIndex, whole: B) {
        let parent = self.nodes[node_id].parent;

        if parent.is_null() {
            let height = self.nodes[node_id].height + 1;
            let len = self.nodes[node_id].len + self.nodes[sibling].len;
            let root = self.nodes.insert(TreeNode::new_internal(
                TreeNodeIndex::null(),
                whole,
                height,
                len,
                Vec::with_capacity(self.capacity + 1),
            ));

            self.root = root;
            self.add_child(root, node_id);
            self.add_child(root, sibling);

            log::debug!("root grew to height {height} with {len} points");
        } else {
            self.set_direct_child(parent, node_id);
            self.add_child(parent, sibling);
        }
    }

    fn add_child(&mut self, node_id: TreeNodeIndex, child: TreeNodeIndex) {
        self.nodes[child].parent = node_id;

        let overflow = match self.nodes[node_id].kind.as_internal_mut() {
            Some(internal) => {
                internal.children.push(child);
                internal.children.len() > self.capacity
            }
            None => unreachable!("children are only attached to internal nodes"),
        };

        if self.nodes[child].is_original() {
            self.set_direct_child(node_id, child);
        }

        if overflow {
            self.split_internal(node_id);
        }
    }

    /// Makes `child` the direct child of `node_id` if its oldest pending split lies inside
    /// `node_id` and covers more than the current direct child's.
    fn set_direct_child(&mut self, node_id: TreeNodeIndex, child: TreeNodeIndex) {
        let current = self.direct_child(node_id);
        if current == child {
            return;
        }

        let node = &self.nodes[node_id];
        let Some(candidate) = self.nodes[child].splits.front() else {
            return;
        };

        if !node.bound.contains_bounds(&candidate.lo) || !node.bound.contains_bounds(&candidate.hi)
        {
            return;
        }

        let replace = match self.nodes.get(current).and_then(|x| x.splits.front()) {
            Some(incumbent) => Self::split_size(candidate) > Self::split_size(incumbent),
            None => true,
        };

        if replace {
            if let Some(internal) = self.nodes[node_id].kind.as_internal_mut() {
                internal.direct = child;
            }
        }
    }

    fn find_direct_child(&mut self, node_id: TreeNodeIndex) {
        for cursor in 0..self.children(node_id).len() {
            let child = self.children(node_id)[cursor];
            if self.nodes[child].is_original() {
                self.set_direct_child(node_id, child);
            }
        }
    }

    /// Pops the oldest pending split of the direct child, or, if that split doesn't separate the
    /// children of `node_id`, the largest one that does. The direct child is released once its
    /// queue runs dry.
    fn take_child_split(&mut self, node_id: TreeNodeIndex) -> Option<RegionSplit<B>> {
        if self.direct_child(node_id).is_null() {
            self.find_direct_child(node_id);
        }

        let direct = self.direct_child(node_id);
        let source = if self.separates_children(node_id, direct) {
            direct
        } else {
            self.children(node_id)
                .iter()
                .copied()
                .filter(|&child| self.separates_children(node_id, child))
                .max_by(|&a, &b| {
                    let size = |x: TreeNodeIndex| {
                        self.nodes[x].splits.front().map_or(0., Self::split_size)
                    };
                    size(a).total_cmp(&size(b))
                })?
        };

        let child = self.nodes.get_mut(source)?;
        let split = child.splits.pop_front()?;

        if child.splits.is_empty() && source == direct {
            if let Some(internal) = self.nodes[node_id].kind.as_internal_mut() {
                internal.direct = TreeNodeIndex::null();
            }
        }

        Some(split)
    }

    /// `true` if the oldest pending split of `child` puts every child of `node_id` wholly on one
    /// side, leaving neither side empty.
    fn separates_children(&self, node_id: TreeNodeIndex, child: TreeNodeIndex) -> bool {
        let Some(split) = self.nodes.get(child).and_then(|x| x.splits.front()) else {
            return false;
        };

        let (mut lo, mut hi) = (0, 0);
        for &sibling in self.children(node_id) {
            let bound = &self.nodes[sibling].bound;
            if split.hi.contains_bounds(bound) {
                hi += 1;
            } else if split.lo.contains_bounds(bound) {
                lo += 1;
            } else {
                return false;
            }
        }

        lo > 0 && hi > 0
    }

    fn split_size(split: &RegionSplit<B>) -> f64 {
        split.lo.size() + split.hi.size()
    }

    fn direct_child(&self, node_id: TreeNodeIndex) -> TreeNodeIndex {
        self.nodes[node_id]
            .kind
            .as_internal()
            .map_or(TreeNodeIndex::null(), |x| x.direct)
    }
}

/// Picks `(axis, fraction)` of the split plane. Sorts `points` along each axis in turn.
///
/// Ties prefer the lowest axis. Returns `None` when no axis can separate the points, which only
/// happens when every point shares the same coordinates.
pub(super) fn select_split_plane<P, B>(bound: &B, points: &mut [P]) -> Option<(AxisIndex, f64)>
where
    P: Point,
    B: Bounds<P>,
{
    let mut best: Option<(AxisIndex, f64)> = None;

    for axis in 0..P::AXES {
        points.sort_unstable_by(|a, b| a.cmp_axis(b, axis));

        let Some(fraction) = axis_split_fraction(bound, points, axis) else {
            continue;
        };

        let best_distance = best.map_or(f64::INFINITY, |(_, x)| (x - 0.5).abs());
        if (fraction - 0.5).abs() < best_distance {
            best = Some((axis, fraction));
        }
    }

    best
}

/// Normalized position of the median of `points`, which must be sorted along `axis`.
///
/// A cut must leave at least one point on each side. If the median is tied with the smallest
/// coordinate, the nearest coordinate above it is tried next, then the ones below.
fn axis_split_fraction<P, B>(bound: &B, points: &[P], axis: AxisIndex) -> Option<f64>
where
    P: Point,
    B: Bounds<P>,
{
    let median = points.len() / 2;
    let candidates = (median..points.len()).chain((1..median).rev());

    for index in candidates {
        let fraction = bound.normalize(&points[index], axis);
        if !(fraction > 0. && fraction < 1.) {
            continue;
        }

        let (_, hi) = bound.split(fraction, axis);
        let moved = points.iter().filter(|p| hi.contains_point(p)).count();
        if moved > 0 && moved < points.len() {
            return Some(fraction);
        }
    }

    None
}
