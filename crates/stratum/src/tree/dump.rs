use std::fmt::{self, Display};

use super::*;

impl<P, B> Display for Tree<P, B>
where
    P: Point + Display,
    B: Bounds<P> + Clone + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RTree w/ height of {}, containing {} points:\n ",
            self.height(),
            self.count()
        )?;

        self.write_node(f, self.root, &mut String::from(" "))
    }
}

impl<P, B> Tree<P, B>
where
    P: Point + Display,
    B: Bounds<P> + Clone + Display,
{
    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node_id: TreeNodeIndex,
        spacer: &mut String,
    ) -> fmt::Result {
        let node = &self.nodes[node_id];

        match &node.kind {
            NodeKind::Leaf(leaf) => {
                write!(f, "Leaf Node {} w/ {} points:", node.bound, node.len)?;

                for (index, point) in leaf.points.iter().enumerate() {
                    let connector = connector(index + 1 == leaf.points.len());
                    write!(f, "\n{spacer}{connector}{point}")?;
                }
            }

            NodeKind::Internal(internal) => {
                write!(
                    f,
                    "Internal Node {} w/ {} points, height of {}:",
                    node.bound, node.len, node.height
                )?;

                for (index, &child) in internal.children.iter().enumerate() {
                    let last = index + 1 == internal.children.len();
                    write!(f, "\n{spacer}{}", connector(last))?;

                    let restore = spacer.len();
                    spacer.push_str(if last { "   " } else { "|  " });
                    self.write_node(f, child, spacer)?;
                    spacer.truncate(restore);
                }
            }
        }

        Ok(())
    }
}

fn connector(last: bool) -> &'static str {
    if last {
        "└- "
    } else {
        "├- "
    }
}
