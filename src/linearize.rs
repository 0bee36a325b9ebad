use std::collections::HashMap;

use tracing::warn;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::unique_identifiers;

/// Where a node ends up in the linearized output.
struct Placement {
    index: usize,
    depth: usize,
    hidden: bool,
}

/// Linearize the nodes into depth first preorder.
///
/// Roots (nodes without parent) keep their relative input order, and so do the children of each node.
/// Every node is directly followed by all of its descendants.
/// `depth` and `hidden` of every node are recomputed from the parent chain, `collapsed` is kept.
///
/// A node whose declared parent does not exist is treated as a root and a warning is logged.
///
/// # Errors
///
/// Errors with [`Error::MalformedInput`] when identifiers are duplicated or parents form a cycle.
pub fn sort<Identifier, Fields>(
    nodes: Vec<Node<Identifier, Fields>>,
) -> Result<Vec<Node<Identifier, Fields>>, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    let placements = {
        let identifiers = unique_identifiers::nodes(&nodes)?;

        let mut roots = Vec::new();
        let mut children = HashMap::<&Identifier, Vec<usize>>::new();
        for (index, node) in nodes.iter().enumerate() {
            match &node.parent {
                Some(parent) if identifiers.contains(parent) => {
                    children.entry(parent).or_default().push(index);
                }
                Some(parent) => {
                    warn!(
                        node = ?node.id,
                        parent = ?parent,
                        "parent does not exist, treating the node as root"
                    );
                    roots.push(index);
                }
                None => roots.push(index),
            }
        }

        let mut placements = Vec::with_capacity(nodes.len());
        for root in roots {
            place(&nodes, &children, root, 0, false, &mut placements);
        }

        if placements.len() != nodes.len() {
            let mut placed = vec![false; nodes.len()];
            for placement in &placements {
                placed[placement.index] = true;
            }
            if let Some(index) = placed.iter().position(|placed| !placed) {
                return Err(Error::MalformedInput(format!(
                    "{:?} can not be reached from any root, its parents form a cycle",
                    nodes[index].id
                )));
            }
        }
        placements
    };

    let mut slots = nodes.into_iter().map(Some).collect::<Vec<_>>();
    let sorted = placements
        .into_iter()
        .filter_map(|placement| {
            let mut node = slots[placement.index].take()?;
            node.depth = placement.depth;
            node.hidden = placement.hidden;
            Some(node)
        })
        .collect();
    Ok(sorted)
}

fn place<Identifier, Fields>(
    nodes: &[Node<Identifier, Fields>],
    children: &HashMap<&Identifier, Vec<usize>>,
    index: usize,
    depth: usize,
    hidden: bool,
    placements: &mut Vec<Placement>,
) where
    Identifier: Eq + core::hash::Hash,
{
    placements.push(Placement {
        index,
        depth,
        hidden,
    });

    let node = &nodes[index];
    let hidden_below = hidden || node.collapsed;
    if let Some(child_indices) = children.get(&node.id) {
        for &child in child_indices {
            place(nodes, children, child, depth + 1, hidden_below, placements);
        }
    }
}

#[cfg(test)]
fn ids<Fields>(nodes: &[Node<&'static str, Fields>]) -> Vec<&'static str> {
    nodes.iter().map(|node| node.id).collect()
}

#[test]
fn roots_then_children_in_input_order() {
    let input = vec![
        Node::new("d", Some("b"), ()),
        Node::root("a", ()),
        Node::new("c", Some("a"), ()),
        Node::root("b", ()),
        Node::new("e", Some("b"), ()),
        Node::new("f", Some("c"), ()),
    ];
    let sorted = sort(input).unwrap();
    assert_eq!(ids(&sorted), ["a", "c", "f", "b", "d", "e"]);
    let depths = sorted.iter().map(Node::depth).collect::<Vec<_>>();
    assert_eq!(depths, [0, 1, 2, 0, 1, 1]);
}

#[test]
fn hidden_is_derived_from_collapsed_ancestors() {
    let input = vec![
        Node::root("a", ()).with_collapsed(true),
        Node::new("b", Some("a"), ()),
        Node::new("c", Some("b"), ()),
        Node::root("d", ()),
    ];
    let sorted = sort(input).unwrap();
    let hidden = sorted.iter().map(Node::is_hidden).collect::<Vec<_>>();
    assert_eq!(hidden, [false, true, true, false]);
    assert!(sorted[0].is_collapsed());
}

#[test]
fn orphan_becomes_root() {
    let input = vec![
        Node::root("a", ()),
        Node::new("b", Some("missing"), ()),
        Node::new("c", Some("b"), ()),
    ];
    let sorted = sort(input).unwrap();
    assert_eq!(ids(&sorted), ["a", "b", "c"]);
    assert_eq!(sorted[1].depth(), 0);
    assert_eq!(sorted[1].parent(), Some(&"missing"));
    assert_eq!(sorted[2].depth(), 1);
}

#[test]
#[should_panic = "form a cycle"]
fn cycle_is_malformed() {
    let input = vec![
        Node::root("a", ()),
        Node::new("b", Some("c"), ()),
        Node::new("c", Some("b"), ()),
    ];
    sort(input).unwrap();
}

#[test]
fn sort_is_idempotent() {
    let input = vec![
        Node::new("c", Some("a"), ()),
        Node::root("a", ()),
        Node::new("b", Some("a"), ()),
    ];
    let once = sort(input).unwrap();
    let twice = sort(once.clone()).unwrap();
    assert_eq!(once, twice);
}
