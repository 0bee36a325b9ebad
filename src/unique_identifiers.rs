use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::node::Node;

/// Ensures that all identifiers in the nodes are unique.
///
/// Returns the set of identifiers which is needed to detect orphans afterwards.
///
/// # Errors
///
/// Errors with [`Error::MalformedInput`] naming the first duplicate.
pub(crate) fn nodes<Identifier, Fields>(
    nodes: &[Node<Identifier, Fields>],
) -> Result<HashSet<&Identifier>, Identifier>
where
    Identifier: Eq + core::hash::Hash + core::fmt::Debug,
{
    let mut identifiers = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !identifiers.insert(&node.id) {
            return Err(Error::MalformedInput(format!(
                "the nodes contain the duplicate identifier {:?}",
                node.id
            )));
        }
    }
    Ok(identifiers)
}

#[test]
fn unique_passes() {
    let input = [Node::root("a", ()), Node::new("b", Some("a"), ())];
    let identifiers = nodes(&input).unwrap();
    assert_eq!(identifiers.len(), 2);
}

#[test]
#[should_panic = "duplicate identifier"]
fn duplicate_errors() {
    let input = [Node::root("a", ()), Node::new("a", Some("b"), ())];
    nodes(&input).unwrap();
}
