use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::node::Node;
use crate::sequence::Sequence;

/// How [`Sequence::move_node`] decided the new parent of the moved node.
///
/// The decision is based on the neighbors left and right of the destination position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reparent<Identifier> {
    /// No neighbor on either side, the node is the only one.
    Root,
    /// Both neighbors share the same parent (`None` for roots and orphans), the node joins them as their sibling.
    Sibling { parent: Option<Identifier> },
    /// The right neighbor is a child of the left one, the node becomes the first child of the left neighbor.
    FirstChild { parent: Identifier },
    /// None of the rules above apply and the parent stays unchanged.
    ///
    /// The node keeps its old parent and linearization places it back among its old siblings.
    Unresolved,
}

impl<Identifier> Reparent<Identifier> {
    /// The parent the node ends up with, `None` when it stays unchanged.
    const fn new_parent(&self) -> Option<Option<&Identifier>> {
        match self {
            Self::Root => Some(None),
            Self::Sibling { parent } => Some(parent.as_ref()),
            Self::FirstChild { parent } => Some(Some(parent)),
            Self::Unresolved => None,
        }
    }
}

/// The parent a node is placed below. Orphans are placed as roots.
fn placed_parent<'a, Identifier, Fields>(
    nodes: &'a [Node<Identifier, Fields>],
    node: &'a Node<Identifier, Fields>,
) -> Option<&'a Identifier>
where
    Identifier: PartialEq,
{
    node.parent
        .as_ref()
        .filter(|parent| nodes.iter().any(|other| &other.id == *parent))
}

/// Decide the parent of the node at `destination` from its neighbors as they are shown.
fn decide<Identifier, Fields>(
    nodes: &[Node<Identifier, Fields>],
    destination: usize,
) -> Reparent<Identifier>
where
    Identifier: Clone + PartialEq,
{
    let left = destination.checked_sub(1).map(|index| &nodes[index]);
    let right = nodes.get(destination + 1);
    match (left, right) {
        (None, None) => Reparent::Root,
        (Some(left), Some(right)) => {
            let left_parent = placed_parent(nodes, left);
            let right_parent = placed_parent(nodes, right);
            if left_parent == right_parent {
                Reparent::Sibling {
                    parent: left_parent.cloned(),
                }
            } else if right_parent == Some(&left.id) {
                Reparent::FirstChild {
                    parent: left.id.clone(),
                }
            } else {
                Reparent::Unresolved
            }
        }
        _ => Reparent::Unresolved,
    }
}

impl<Identifier, Fields> Sequence<Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: Clone,
{
    /// Move the node at `source` to the flat position `destination`.
    ///
    /// Positions are the ones of this sequence, hidden nodes included.
    /// The new parent is derived from the new neighbors, see [`Reparent`].
    /// Neighbors whose parent is missing (orphans) count as roots, just like they are shown.
    /// Descendants of the moved node keep their parent and follow it.
    ///
    /// # Errors
    ///
    /// - [`Error::PositionOutOfRange`] when `source` or `destination` are not within the sequence.
    /// - [`Error::CycleRejected`] when the neighbors would make the node a child of itself or one of its descendants.
    pub fn move_node(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<(Self, Reparent<Identifier>), Identifier> {
        let len = self.nodes.len();
        for index in [source, destination] {
            if index >= len {
                return Err(Error::PositionOutOfRange { index, len });
            }
        }

        let mut nodes = self.nodes.clone();
        let moved = nodes.remove(source);
        nodes.insert(destination, moved);

        let reparent = decide(&nodes, destination);

        let moved_id = nodes[destination].id.clone();
        match reparent.new_parent() {
            Some(Some(parent))
                if parent == &moved_id || self.is_descendant_of(parent, &moved_id)? =>
            {
                return Err(Error::CycleRejected {
                    node: moved_id,
                    parent: parent.clone(),
                });
            }
            Some(parent) => nodes[destination].parent = parent.cloned(),
            None => warn!(
                node = ?moved_id,
                source,
                destination,
                "neighbors do not determine a new parent, keeping the old one"
            ),
        }

        debug!(source, destination, ?reparent, "moved node");
        let sequence = Self::new(nodes)?;
        Ok((sequence, reparent))
    }

    /// Nest the `source` node below `destination`.
    ///
    /// Among its new siblings the node keeps the place its current flat position gives it.
    /// The destination gets expanded so the nested node is visible unless an ancestor of the destination is collapsed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when one of the nodes does not exist.
    /// - [`Error::CycleRejected`] when source and destination are the same or destination is a descendant of source.
    pub fn combine(&self, source: &Identifier, destination: &Identifier) -> Result<Self, Identifier> {
        let source_index = self.index_of(source)?;
        let destination_index = self.index_of(destination)?;
        if source_index == destination_index || self.is_descendant_of(destination, source)? {
            return Err(Error::CycleRejected {
                node: source.clone(),
                parent: destination.clone(),
            });
        }

        let mut nodes = self.nodes.clone();
        nodes[source_index].parent = Some(destination.clone());
        nodes[destination_index].collapsed = false;

        debug!(?source, ?destination, "combined nodes");
        Self::new(nodes)
    }
}

#[test]
fn move_single_node_is_root() {
    let sequence = Sequence::new(vec![Node::new("a", Some("gone"), ())]).unwrap();
    let (moved, reparent) = sequence.move_node(0, 0).unwrap();
    assert_eq!(reparent, Reparent::Root);
    assert!(moved.nodes[0].is_root());
}

#[test]
fn move_between_orphans_joins_roots() {
    let sequence = Sequence::new(vec![
        Node::root("a", ()),
        Node::new("x", Some("gone"), ()),
        Node::new("y", Some("gone"), ()),
    ])
    .unwrap();
    let (moved, reparent) = sequence.move_node(0, 1).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: None });
    assert_eq!(moved.ids(), ["x", "a", "y"]);
    assert!(moved.node(&"a").unwrap().is_root());
}

#[test]
fn move_between_orphan_and_root_joins_roots() {
    let sequence = Sequence::new(vec![
        Node::new("x", Some("gone"), ()),
        Node::root("a", ()),
        Node::new("b", Some("a"), ()),
    ])
    .unwrap();
    // move b between x and a
    let (moved, reparent) = sequence.move_node(2, 1).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: None });
    assert_eq!(moved.ids(), ["x", "b", "a"]);
    assert_eq!(moved.node(&"b").unwrap().depth(), 0);
}

#[test]
fn move_root_to_top() {
    // a, b below a, c
    let sequence = Sequence::new(vec![
        Node::root("a", ()),
        Node::new("b", Some("a"), ()),
        Node::root("c", ()),
    ])
    .unwrap();
    let (moved, _) = sequence.move_node(2, 0).unwrap();
    assert_eq!(moved.ids(), ["c", "a", "b"]);
    assert!(moved.node(&"c").unwrap().is_root());
    assert_eq!(moved.node(&"b").unwrap().depth(), 1);
}

#[test]
fn move_between_siblings() {
    let sequence = Sequence::example();
    // move g between c and d
    let (moved, reparent) = sequence.move_node(6, 3).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: Some("b") });
    assert_eq!(moved.ids(), ["a", "b", "c", "g", "d", "e", "f", "h"]);
}

#[test]
fn move_between_roots() {
    let sequence = Sequence::example();
    // move e between a and b
    let (moved, reparent) = sequence.move_node(4, 1).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: None });
    assert_eq!(moved.ids(), ["a", "e", "b", "c", "d", "f", "g", "h"]);
    assert_eq!(moved.node(&"e").unwrap().depth(), 0);
}

#[test]
fn move_to_first_child() {
    let sequence = Sequence::example();
    // move h between b and c
    let (moved, reparent) = sequence.move_node(7, 2).unwrap();
    assert_eq!(reparent, Reparent::FirstChild { parent: "b" });
    assert_eq!(moved.ids(), ["a", "b", "h", "c", "d", "e", "f", "g"]);
    assert_eq!(moved.node(&"h").unwrap().depth(), 1);
}

#[test]
fn move_subtree_follows() {
    let sequence = Sequence::example();
    // move d (with e and f) between a and b
    let (moved, reparent) = sequence.move_node(3, 1).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: None });
    assert_eq!(moved.ids(), ["a", "d", "e", "f", "b", "c", "g", "h"]);
    assert_eq!(moved.node(&"e").unwrap().depth(), 1);
}

#[test]
fn move_unresolved_keeps_parent() {
    let sequence = Sequence::example();
    // move c to the very end: left is h, no right neighbor
    let (moved, reparent) = sequence.move_node(2, 7).unwrap();
    assert_eq!(reparent, Reparent::Unresolved);
    assert_eq!(moved.node(&"c").unwrap().parent(), Some(&"b"));
    assert_eq!(moved.ids(), ["a", "b", "d", "e", "f", "g", "c", "h"]);
}

#[test]
fn move_into_own_subtree_is_rejected() {
    let sequence = Sequence::example();
    // move b between e and f, both children of d which is below b
    let result = sequence.move_node(1, 4);
    assert_eq!(
        result.unwrap_err(),
        Error::CycleRejected {
            node: "b",
            parent: "d"
        }
    );
}

#[test]
fn move_out_of_range() {
    let sequence = Sequence::example();
    assert_eq!(
        sequence.move_node(8, 0).unwrap_err(),
        Error::PositionOutOfRange { index: 8, len: 8 }
    );
    assert_eq!(
        sequence.move_node(0, 8).unwrap_err(),
        Error::PositionOutOfRange { index: 8, len: 8 }
    );
}

#[test]
fn move_below_collapsed_parent_is_hidden() {
    let sequence = Sequence::example().collapse(&"d").unwrap();
    // move h between e and f
    let (moved, reparent) = sequence.move_node(7, 5).unwrap();
    assert_eq!(reparent, Reparent::Sibling { parent: Some("d") });
    assert!(moved.node(&"h").unwrap().is_hidden());
}

#[test]
fn combine_nests_below_destination() {
    let sequence = Sequence::example();
    let combined = sequence.combine(&"a", &"d").unwrap();
    assert_eq!(combined.ids(), ["b", "c", "d", "a", "e", "f", "g", "h"]);
    assert_eq!(combined.node(&"a").unwrap().parent(), Some(&"d"));
    assert_eq!(combined.node(&"a").unwrap().depth(), 2);
}

#[test]
fn combine_keeps_flat_position_among_siblings() {
    let sequence = Sequence::example();
    let combined = sequence.combine(&"h", &"d").unwrap();
    assert_eq!(combined.ids(), ["a", "b", "c", "d", "e", "f", "h", "g"]);
}

#[test]
fn combine_expands_destination() {
    let sequence = Sequence::example().collapse(&"d").unwrap();
    let combined = sequence.combine(&"h", &"d").unwrap();
    assert!(!combined.node(&"d").unwrap().is_collapsed());
    assert!(!combined.node(&"h").unwrap().is_hidden());
    assert!(!combined.node(&"e").unwrap().is_hidden());
}

#[test]
fn combine_below_hidden_destination_stays_hidden() {
    let sequence = Sequence::example()
        .collapse(&"d")
        .unwrap()
        .collapse(&"b")
        .unwrap();
    let combined = sequence.combine(&"h", &"d").unwrap();
    assert!(combined.node(&"h").unwrap().is_hidden());
    assert!(combined.node(&"e").unwrap().is_hidden());
}

#[test]
fn combine_into_descendant_is_rejected() {
    let sequence = Sequence::example();
    assert_eq!(
        sequence.combine(&"b", &"e").unwrap_err(),
        Error::CycleRejected {
            node: "b",
            parent: "e"
        }
    );
    assert_eq!(
        sequence.combine(&"b", &"b").unwrap_err(),
        Error::CycleRejected {
            node: "b",
            parent: "b"
        }
    );
}

#[test]
fn combine_unknown_is_not_found() {
    let sequence = Sequence::example();
    assert_eq!(
        sequence.combine(&"z", &"a").unwrap_err(),
        Error::NotFound("z")
    );
    assert_eq!(
        sequence.combine(&"a", &"z").unwrap_err(),
        Error::NotFound("z")
    );
}
