use crate::error::{Error, Result};
use crate::node::Node;
use crate::sequence::Sequence;

/// Walks from the node at `index` towards the root and yields the flat positions of its ancestors.
///
/// Stops at a parent that does not exist in `nodes` (orphan).
/// The walk is bounded by the amount of nodes so a broken parent chain can not loop forever.
pub(crate) fn ancestor_indices<Identifier, Fields>(
    nodes: &[Node<Identifier, Fields>],
    index: usize,
) -> impl Iterator<Item = usize> + '_
where
    Identifier: PartialEq,
{
    let mut current = index;
    std::iter::from_fn(move || {
        let parent = nodes[current].parent.as_ref()?;
        let parent_index = nodes.iter().position(|node| &node.id == parent)?;
        current = parent_index;
        Some(parent_index)
    })
    .take(nodes.len())
}

/// Queries on a [`Sequence`].
///
/// None of them change the sequence.
/// Every identifier based query errors with [`Error::NotFound`] when the identifier is not part of the sequence.
impl<Identifier, Fields> Sequence<Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    /// Flat position of the node.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn index_of(&self, id: &Identifier) -> Result<usize, Identifier> {
        self.nodes
            .iter()
            .position(|node| &node.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn node(&self, id: &Identifier) -> Result<&Node<Identifier, Fields>, Identifier> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Direct children in sequence order.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn children(&self, id: &Identifier) -> Result<Vec<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        let end = self.subtree_end(index);
        Ok(self.nodes[index + 1..end]
            .iter()
            .filter(|node| node.parent.as_ref() == Some(id))
            .collect())
    }

    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn has_children(&self, id: &Identifier) -> Result<bool, Identifier> {
        self.index_of(id).map(|index| self.has_children_at(index))
    }

    /// All descendants in preorder.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn descendants(
        &self,
        id: &Identifier,
    ) -> Result<&[Node<Identifier, Fields>], Identifier> {
        let index = self.index_of(id)?;
        Ok(&self.nodes[index + 1..self.subtree_end(index)])
    }

    /// Ancestors starting with the parent and ending with the root.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn ancestors(&self, id: &Identifier) -> Result<Vec<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        Ok(ancestor_indices(&self.nodes, index)
            .map(|index| &self.nodes[index])
            .collect())
    }

    /// `true` when `id` is a descendant of `ancestor`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when either node does not exist.
    pub fn is_descendant_of(
        &self,
        id: &Identifier,
        ancestor: &Identifier,
    ) -> Result<bool, Identifier> {
        let index = self.index_of(id)?;
        let ancestor_index = self.index_of(ancestor)?;
        Ok(ancestor_indices(&self.nodes, index).any(|index| index == ancestor_index))
    }

    /// The node before in flat order, hidden or not.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn previous(&self, id: &Identifier) -> Result<Option<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        Ok(index.checked_sub(1).map(|index| &self.nodes[index]))
    }

    /// The node after in flat order, hidden or not.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn next(&self, id: &Identifier) -> Result<Option<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        Ok(self.nodes.get(index + 1))
    }

    /// The closest node before which is not hidden.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn previous_visible(
        &self,
        id: &Identifier,
    ) -> Result<Option<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        Ok(self.nodes[..index].iter().rev().find(|node| !node.hidden))
    }

    /// The closest node after which is not hidden.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn next_visible(
        &self,
        id: &Identifier,
    ) -> Result<Option<&Node<Identifier, Fields>>, Identifier> {
        let index = self.index_of(id)?;
        Ok(self.nodes[index + 1..].iter().find(|node| !node.hidden))
    }

    /// Walks the whole ancestor chain and checks every ancestor, not only the parent.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when there is no such node.
    pub fn is_any_ancestor_collapsed(&self, id: &Identifier) -> Result<bool, Identifier> {
        let index = self.index_of(id)?;
        Ok(ancestor_indices(&self.nodes, index).any(|index| self.nodes[index].collapsed))
    }

    /// Nodes which declare a parent that is not part of the sequence.
    ///
    /// They are placed as roots.
    /// This is a data integrity problem of the source the nodes were loaded from.
    #[must_use]
    pub fn orphans(&self) -> Vec<&Node<Identifier, Fields>> {
        self.nodes
            .iter()
            .filter(|node| {
                node.parent
                    .as_ref()
                    .is_some_and(|parent| !self.nodes.iter().any(|other| &other.id == parent))
            })
            .collect()
    }
}

#[cfg(test)]
fn ids_of(nodes: &[&Node<&'static str, ()>]) -> Vec<&'static str> {
    nodes.iter().map(|node| node.id).collect()
}

#[test]
fn index_of_works() {
    let sequence = Sequence::example();
    assert_eq!(sequence.index_of(&"a"), Ok(0));
    assert_eq!(sequence.index_of(&"e"), Ok(4));
    assert_eq!(sequence.index_of(&"z"), Err(Error::NotFound("z")));
}

#[test]
fn children_works() {
    let sequence = Sequence::example();
    assert_eq!(ids_of(&sequence.children(&"b").unwrap()), ["c", "d", "g"]);
    assert_eq!(ids_of(&sequence.children(&"d").unwrap()), ["e", "f"]);
    assert!(sequence.children(&"a").unwrap().is_empty());
}

#[test]
fn has_children_works() {
    let sequence = Sequence::example();
    assert_eq!(sequence.has_children(&"b"), Ok(true));
    assert_eq!(sequence.has_children(&"c"), Ok(false));
    assert_eq!(sequence.has_children(&"h"), Ok(false));
}

#[test]
fn descendants_are_preorder() {
    let sequence = Sequence::example();
    let descendants = sequence
        .descendants(&"b")
        .unwrap()
        .iter()
        .map(|node| node.id)
        .collect::<Vec<_>>();
    assert_eq!(descendants, ["c", "d", "e", "f", "g"]);
    assert!(sequence.descendants(&"h").unwrap().is_empty());
}

#[test]
fn ancestors_are_root_ward() {
    let sequence = Sequence::example();
    assert_eq!(ids_of(&sequence.ancestors(&"f").unwrap()), ["d", "b"]);
    assert!(sequence.ancestors(&"b").unwrap().is_empty());
    assert_eq!(sequence.is_descendant_of(&"f", &"b"), Ok(true));
    assert_eq!(sequence.is_descendant_of(&"b", &"f"), Ok(false));
}

#[test]
fn neighbors_work() {
    let sequence = Sequence::example();
    assert_eq!(sequence.previous(&"a").unwrap(), None);
    assert_eq!(sequence.previous(&"c").unwrap().map(Node::id), Some(&"b"));
    assert_eq!(sequence.next(&"g").unwrap().map(Node::id), Some(&"h"));
    assert_eq!(sequence.next(&"h").unwrap(), None);
}

#[test]
fn visible_neighbors_skip_hidden() {
    let sequence = Sequence::example().collapse(&"d").unwrap();
    assert_eq!(sequence.next_visible(&"d").unwrap().map(Node::id), Some(&"g"));
    assert_eq!(
        sequence.previous_visible(&"g").unwrap().map(Node::id),
        Some(&"d")
    );
}

#[test]
fn any_ancestor_collapsed_walks_whole_chain() {
    let sequence = Sequence::example().collapse(&"b").unwrap();
    assert_eq!(sequence.is_any_ancestor_collapsed(&"e"), Ok(true));
    assert_eq!(sequence.is_any_ancestor_collapsed(&"b"), Ok(false));
    assert_eq!(sequence.is_any_ancestor_collapsed(&"h"), Ok(false));
}

#[test]
fn queries_with_unknown_id_are_not_found() {
    let sequence = Sequence::example();
    let missing = Error::NotFound("z");
    assert_eq!(sequence.node(&"z").unwrap_err(), missing);
    assert_eq!(sequence.children(&"z").unwrap_err(), missing);
    assert_eq!(sequence.has_children(&"z").unwrap_err(), missing);
    assert_eq!(sequence.descendants(&"z").unwrap_err(), missing);
    assert_eq!(sequence.ancestors(&"z").unwrap_err(), missing);
    assert_eq!(sequence.previous(&"z").unwrap_err(), missing);
    assert_eq!(sequence.next(&"z").unwrap_err(), missing);
    assert_eq!(sequence.is_any_ancestor_collapsed(&"z").unwrap_err(), missing);
}

#[test]
fn orphans_are_reported() {
    let sequence = Sequence::new(vec![
        Node::root("a", ()),
        Node::new("b", Some("gone"), ()),
    ])
    .unwrap();
    assert_eq!(ids_of(&sequence.orphans()), ["b"]);
    assert!(Sequence::example().orphans().is_empty());
}
