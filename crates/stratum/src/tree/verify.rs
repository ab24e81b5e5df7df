use std::cmp::Ordering;

use super::*;

impl<P, B> Tree<P, B>
where
    P: Point,
    B: Bounds<P> + Clone,
{
    /// Walks the whole tree and checks its structural invariants, reporting the first violation.
    #[doc(hidden)]
    pub fn __debug_verify_tree_state(&self) -> Result<(), String> {
        let root = &self.nodes[self.root];
        if !root.parent.is_null() {
            return Err(format!("root {:?} has a parent", self.root));
        }

        let mut visited = 0;
        self.verify_recursive(self.root, &mut visited)?;

        if visited != self.nodes.len() {
            return Err(format!(
                "{} nodes reachable from root, {} allocated",
                visited,
                self.nodes.len()
            ));
        }

        Ok(())
    }

    fn verify_recursive(&self, node_id: TreeNodeIndex, visited: &mut usize) -> Result<(), String> {
        let node = &self.nodes[node_id];
        *visited += 1;

        match &node.kind {
            NodeKind::Leaf(leaf) => {
                if node.height != 1 {
                    return Err(format!("leaf {node_id:?} has height {}", node.height));
                }

                if leaf.points.len() != node.len {
                    return Err(format!(
                        "leaf {node_id:?} holds {} points, counts {}",
                        leaf.points.len(),
                        node.len
                    ));
                }

                if let Some(at) = leaf.points.iter().position(|p| !node.bound.contains_point(p)) {
                    return Err(format!("leaf {node_id:?} holds point #{at} outside of it"));
                }

                // Only points sharing every coordinate can't be split apart.
                if let Some(first) = leaf.points.first().filter(|_| node.len > self.capacity) {
                    let coincident = leaf.points.iter().all(|p| {
                        (0..P::AXES).all(|axis| p.cmp_axis(first, axis) == Ordering::Equal)
                    });

                    if !coincident {
                        return Err(format!(
                            "leaf {node_id:?} holds {} points over capacity {}",
                            node.len, self.capacity
                        ));
                    }
                }
            }

            NodeKind::Internal(internal) => {
                if internal.children.is_empty() {
                    return Err(format!("internal node {node_id:?} has no children"));
                }

                if !internal.direct.is_null() && !internal.children.contains(&internal.direct) {
                    return Err(format!(
                        "internal node {node_id:?} points to foreign direct child {:?}",
                        internal.direct
                    ));
                }

                let mut sum = 0;
                for &child_id in &internal.children {
                    let Some(child) = self.nodes.get(child_id) else {
                        return Err(format!("{node_id:?} refers to released node {child_id:?}"));
                    };

                    if child.parent != node_id {
                        return Err(format!(
                            "{child_id:?} is a child of {node_id:?}, but its parent is {:?}",
                            child.parent
                        ));
                    }

                    if child.height >= node.height {
                        return Err(format!(
                            "{child_id:?} at height {} is not below its parent at {}",
                            child.height, node.height
                        ));
                    }

                    if !node.bound.contains_bounds(&child.bound) {
                        return Err(format!("{child_id:?} sticks out of {node_id:?}"));
                    }

                    sum += child.len;
                    self.verify_recursive(child_id, visited)?;
                }

                if sum != node.len {
                    return Err(format!(
                        "internal node {node_id:?} counts {}, children hold {sum}",
                        node.len
                    ));
                }
            }
        }

        Ok(())
    }
}
