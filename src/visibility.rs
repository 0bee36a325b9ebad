use crate::error::Result;
#[cfg(test)]
use crate::node::Node;
use crate::query::ancestor_indices;
use crate::sequence::Sequence;

impl<Identifier, Fields> Sequence<Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: Clone,
{
    /// Collapse a node.
    ///
    /// Every descendant gets hidden, no matter whether it is collapsed itself.
    /// Order and parents stay the same.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) when there is no such node.
    pub fn collapse(&self, id: &Identifier) -> Result<Self, Identifier> {
        let index = self.index_of(id)?;
        let end = self.subtree_end(index);

        let mut nodes = self.nodes.clone();
        nodes[index].collapsed = true;
        for node in &mut nodes[index + 1..end] {
            node.hidden = true;
        }
        Ok(Self { nodes })
    }

    /// Expand a node.
    ///
    /// Descendants are only revealed when no other collapsed ancestor remains between them and the root.
    /// Order and parents stay the same.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) when there is no such node.
    pub fn expand(&self, id: &Identifier) -> Result<Self, Identifier> {
        let index = self.index_of(id)?;
        let end = self.subtree_end(index);

        let mut nodes = self.nodes.clone();
        nodes[index].collapsed = false;
        for descendant in index + 1..end {
            let blocked =
                ancestor_indices(&nodes, descendant).any(|ancestor| nodes[ancestor].collapsed);
            nodes[descendant].hidden = blocked;
        }
        Ok(Self { nodes })
    }

    /// [`expand`](Self::expand) a collapsed node, [`collapse`](Self::collapse) an expanded one.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) when there is no such node.
    pub fn toggle(&self, id: &Identifier) -> Result<Self, Identifier> {
        if self.node(id)?.collapsed {
            self.expand(id)
        } else {
            self.collapse(id)
        }
    }
}

#[cfg(test)]
fn hidden(sequence: &Sequence<&'static str, ()>) -> Vec<&'static str> {
    sequence
        .iter()
        .filter(|node| node.is_hidden())
        .map(|node| node.id)
        .collect()
}

#[test]
fn collapse_hides_all_descendants() {
    let sequence = Sequence::example().collapse(&"b").unwrap();
    assert_eq!(hidden(&sequence), ["c", "d", "e", "f", "g"]);
    assert!(sequence.node(&"b").unwrap().is_collapsed());
    assert!(!sequence.node(&"b").unwrap().is_hidden());
}

#[test]
fn collapse_does_not_change_the_input() {
    let sequence = Sequence::example();
    let collapsed = sequence.collapse(&"b").unwrap();
    assert_ne!(collapsed, sequence);
    assert!(hidden(&sequence).is_empty());
    assert_eq!(collapsed.ids(), sequence.ids());
}

#[test]
fn expand_is_inverse_of_collapse() {
    let sequence = Sequence::example();
    let restored = sequence.collapse(&"d").unwrap().expand(&"d").unwrap();
    assert_eq!(restored, sequence);
}

#[test]
fn expand_keeps_nodes_below_other_collapsed_ancestor_hidden() {
    let sequence = Sequence::example()
        .collapse(&"d")
        .unwrap()
        .collapse(&"b")
        .unwrap();
    assert_eq!(hidden(&sequence), ["c", "d", "e", "f", "g"]);

    let expanded = sequence.expand(&"b").unwrap();
    assert_eq!(hidden(&expanded), ["e", "f"]);

    let expanded = expanded.expand(&"d").unwrap();
    assert!(hidden(&expanded).is_empty());
}

#[test]
fn collapse_cascades_over_collapsed_child() {
    // a, b (collapsed) below a, c below b
    let sequence = Sequence::new(vec![
        Node::root("a", ()),
        Node::new("b", Some("a"), ()).with_collapsed(true),
        Node::new("c", Some("b"), ()),
    ])
    .unwrap();
    assert_eq!(hidden(&sequence), ["c"]);

    let collapsed = sequence.collapse(&"a").unwrap();
    assert_eq!(hidden(&collapsed), ["b", "c"]);

    let expanded = collapsed.expand(&"a").unwrap();
    assert_eq!(hidden(&expanded), ["c"]);

    let all = expanded.expand(&"b").unwrap();
    assert!(hidden(&all).is_empty());
}

#[test]
fn toggle_flips() {
    let sequence = Sequence::example();
    let toggled = sequence.toggle(&"b").unwrap();
    assert!(toggled.node(&"b").unwrap().is_collapsed());
    assert_eq!(toggled.toggle(&"b").unwrap(), sequence);
}

#[test]
fn unknown_node_is_not_found() {
    let sequence = Sequence::example();
    assert_eq!(
        sequence.collapse(&"z").unwrap_err(),
        crate::Error::NotFound("z")
    );
    assert_eq!(
        sequence.expand(&"z").unwrap_err(),
        crate::Error::NotFound("z")
    );
}
