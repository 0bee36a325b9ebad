use crate::error::Result;
use crate::linearize;
use crate::node::Node;

/// The full tree as one flat, depth first ordered list of [`Node`]s.
///
/// A `Sequence` is always linearized:
/// every node is directly followed by all of its descendants, `depth` matches the parent chain and `hidden` matches the collapsed ancestors.
///
/// Operations never change a `Sequence` in place.
/// They take `&self` and return the next `Sequence`, which is then owned by the caller (for example some UI state).
///
/// # Example
///
/// ```
/// # use tree_table::{Node, Sequence};
/// let sequence = Sequence::new(vec![
///     Node::new("b", Some("a"), ()),
///     Node::root("a", ()),
/// ])?;
/// let ids = sequence.iter().map(|node| *node.id()).collect::<Vec<_>>();
/// assert_eq!(ids, ["a", "b"]);
///
/// let collapsed = sequence.collapse(&"a")?;
/// assert!(collapsed.node(&"b")?.is_hidden());
/// assert!(!sequence.node(&"b")?.is_hidden());
/// # Ok::<(), tree_table::Error<&str>>(())
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<Identifier, Fields> {
    pub(crate) nodes: Vec<Node<Identifier, Fields>>,
}

impl<Identifier, Fields> Default for Sequence<Identifier, Fields> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<Identifier, Fields> Sequence<Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    /// Create a new `Sequence` from an unordered collection of nodes.
    ///
    /// See [`sort`](crate::sort) for the ordering rules.
    ///
    /// # Errors
    ///
    /// Errors with [`Error::MalformedInput`](crate::Error::MalformedInput) when identifiers are duplicated or parents form a cycle.
    pub fn new(nodes: Vec<Node<Identifier, Fields>>) -> Result<Self, Identifier> {
        linearize::sort(nodes).map(|nodes| Self { nodes })
    }

    /// Linearize again.
    ///
    /// As a `Sequence` is always linearized this returns an equal `Sequence`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn sort(&self) -> Result<Self, Identifier>
    where
        Fields: Clone,
    {
        Self::new(self.nodes.clone())
    }
}

impl<Identifier, Fields> Sequence<Identifier, Fields> {
    #[must_use]
    pub fn nodes(&self) -> &[Node<Identifier, Fields>] {
        &self.nodes
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<Node<Identifier, Fields>> {
        self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the node at the flat position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node<Identifier, Fields>> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<Identifier, Fields>> {
        self.nodes.iter()
    }

    /// All nodes which are not hidden below a collapsed ancestor together with their flat position.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Node<Identifier, Fields>)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.hidden)
    }

    /// The end (exclusive) of the subtree starting at `index`.
    ///
    /// Relies on the linearization: the subtree is the node followed by every deeper node.
    pub(crate) fn subtree_end(&self, index: usize) -> usize {
        let depth = self.nodes[index].depth;
        self.nodes[index + 1..]
            .iter()
            .position(|node| node.depth <= depth)
            .map_or(self.nodes.len(), |offset| index + 1 + offset)
    }

    /// Whether the node at the flat position has at least one child.
    pub(crate) fn has_children_at(&self, index: usize) -> bool {
        self.subtree_end(index) > index + 1
    }
}

impl<'a, Identifier, Fields> IntoIterator for &'a Sequence<Identifier, Fields> {
    type Item = &'a Node<Identifier, Fields>;
    type IntoIter = std::slice::Iter<'a, Node<Identifier, Fields>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Example tree used by the tests.
///
/// ```text
/// a
/// b
/// ├─ c
/// ├─ d
/// │  ├─ e
/// │  └─ f
/// └─ g
/// h
/// ```
#[cfg(test)]
impl Sequence<&'static str, ()> {
    pub(crate) fn example() -> Self {
        Self::new(vec![
            Node::root("a", ()),
            Node::root("b", ()),
            Node::new("c", Some("b"), ()),
            Node::new("d", Some("b"), ()),
            Node::new("e", Some("d"), ()),
            Node::new("f", Some("d"), ()),
            Node::new("g", Some("b"), ()),
            Node::root("h", ()),
        ])
        .expect("example is a valid tree")
    }

    pub(crate) fn ids(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|node| node.id).collect()
    }
}

#[test]
fn depth_works() {
    let depths = Sequence::example()
        .iter()
        .map(Node::depth)
        .collect::<Vec<_>>();
    assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
}

#[test]
fn subtree_end_works() {
    let sequence = Sequence::example();
    assert_eq!(sequence.subtree_end(0), 1);
    assert_eq!(sequence.subtree_end(1), 7);
    assert_eq!(sequence.subtree_end(3), 6);
    assert_eq!(sequence.subtree_end(7), 8);
}

#[test]
fn sort_of_sequence_is_equal() {
    let sequence = Sequence::example();
    assert_eq!(sequence.sort().unwrap(), sequence);
}

#[test]
fn visible_skips_hidden() {
    let sequence = Sequence::new(vec![
        Node::root("a", ()).with_collapsed(true),
        Node::new("b", Some("a"), ()),
        Node::root("c", ()),
    ])
    .unwrap();
    let visible = sequence
        .visible()
        .map(|(index, node)| (index, node.id))
        .collect::<Vec<_>>();
    assert_eq!(visible, [(0, "a"), (2, "c")]);
}
