//! Depth-first traversal with pre-order enter and post-order exit.
//!
//! The walker is generic over [`Traversable`] so the persistent [`Node`]
//! graph and any tree derived from it (the resolver's placed tree, for
//! instance) share one implementation of the visiting rules.

use crate::node::Node;

/// A tree whose children can be listed in order.
pub trait Traversable {
    /// Children in document order.
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

impl Traversable for Node {
    fn children(&self) -> &[Self] {
        Self::children(self)
    }
}

/// What a visitor wants done with a node's children.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Visit {
    /// Visit every child left to right.
    #[default]
    Children,
    /// Do not descend. `exit` still runs for this node.
    Skip,
    /// Visit the children at these indices, in this order. Indices out of
    /// range are ignored.
    Order(Vec<usize>),
}

/// Callbacks invoked by [`traverse`].
pub trait Visitor<T> {
    /// Called before the node's children.
    fn enter(&mut self, node: &T, depth: usize) -> Visit;

    /// Called after the node's children.
    fn exit(&mut self, _node: &T, _depth: usize) {}
}

/// Walks `root` depth first.
pub fn traverse<T: Traversable, V: Visitor<T> + ?Sized>(root: &T, visitor: &mut V) {
    walk(root, 0, visitor);
}

fn walk<T: Traversable, V: Visitor<T> + ?Sized>(node: &T, depth: usize, visitor: &mut V) {
    let children = node.children();
    match visitor.enter(node, depth) {
        Visit::Children => {
            for child in children {
                walk(child, depth + 1, visitor);
            }
        }
        Visit::Skip => {}
        Visit::Order(order) => {
            for index in order {
                if let Some(child) = children.get(index) {
                    walk(child, depth + 1, visitor);
                }
            }
        }
    }
    visitor.exit(node, depth);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn text(s: &str) -> Node {
        Node::leaf(NodeKind::Text(s.into()))
    }

    #[derive(Default)]
    struct Trace {
        log: Vec<String>,
    }

    impl Visitor<Node> for Trace {
        fn enter(&mut self, node: &Node, _depth: usize) -> Visit {
            match node.kind() {
                NodeKind::Text(s) => self.log.push(format!("+{s}")),
                NodeKind::Hidden => return Visit::Skip,
                NodeKind::ZIndex(_) => return Visit::Order(vec![1, 0, 7]),
                _ => {}
            }
            Visit::Children
        }

        fn exit(&mut self, node: &Node, _depth: usize) {
            if let NodeKind::Text(s) = node.kind() {
                self.log.push(format!("-{s}"));
            }
        }
    }

    #[test]
    fn enter_and_exit_nest() {
        let tree = Node::with_children(NodeKind::Empty, vec![text("a"), text("b")]);
        let mut trace = Trace::default();
        traverse(&tree, &mut trace);
        assert_eq!(trace.log, ["+a", "-a", "+b", "-b"]);
    }

    #[test]
    fn skip_and_reorder() {
        let hidden = Node::wrap(NodeKind::Hidden, text("gone"));
        let reordered = Node::with_children(NodeKind::ZIndex(0.0), vec![text("x"), text("y")]);
        let tree = Node::with_children(NodeKind::Empty, vec![hidden, reordered]);
        let mut trace = Trace::default();
        traverse(&tree, &mut trace);
        assert_eq!(trace.log, ["+y", "-y", "+x", "-x"]);
    }
}
