//! Generated forests and operation sequences always stay linearized.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::sample::Index;
use tree_table::{Error, Node, OrderKeys, Reparent, Sequence};

/// Identifiers at and above this are never part of a generated forest.
const MISSING: usize = 10_000;

/// Node `i` gets a parent below `i` (or none), delivered in random order.
///
/// With `orphans` some nodes declare a parent which does not exist.
fn forest(max_len: usize, orphans: bool) -> impl Strategy<Value = Vec<Node<usize, ()>>> {
    let orphan_rate = if orphans { 0.2 } else { 0.0 };
    prop::collection::vec(
        (
            prop::option::of(any::<Index>()),
            prop::bool::weighted(orphan_rate),
            any::<bool>(),
        ),
        1..max_len,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(id, (parent, orphan, collapsed))| {
                let parent = if orphan {
                    Some(MISSING + id)
                } else {
                    parent.filter(|_| id > 0).map(|parent| parent.index(id))
                };
                Node::new(id, parent, ()).with_collapsed(collapsed)
            })
            .collect::<Vec<_>>()
    })
    .prop_shuffle()
}

#[derive(Debug, Clone)]
enum Operation {
    Collapse(Index),
    Expand(Index),
    Move(Index, Index),
    Combine(Index, Index),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        any::<Index>().prop_map(Operation::Collapse),
        any::<Index>().prop_map(Operation::Expand),
        (any::<Index>(), any::<Index>()).prop_map(|(source, destination)| Operation::Move(source, destination)),
        (any::<Index>(), any::<Index>()).prop_map(|(source, destination)| Operation::Combine(source, destination)),
    ]
}

fn id_at(sequence: &Sequence<usize, ()>, index: &Index) -> usize {
    *sequence.nodes()[index.index(sequence.len())].id()
}

fn apply(
    sequence: &Sequence<usize, ()>,
    operation: &Operation,
) -> Result<Sequence<usize, ()>, TestCaseError> {
    let len = sequence.len();
    let result = match operation {
        Operation::Collapse(index) => sequence.collapse(&id_at(sequence, index)),
        Operation::Expand(index) => sequence.expand(&id_at(sequence, index)),
        Operation::Move(source, destination) => sequence
            .move_node(source.index(len), destination.index(len))
            .map(|(sequence, _)| sequence),
        Operation::Combine(source, destination) => {
            sequence.combine(&id_at(sequence, source), &id_at(sequence, destination))
        }
    };
    match result {
        Ok(next) => Ok(next),
        Err(error) => {
            prop_assert!(
                matches!(error, Error::CycleRejected { .. }),
                "unexpected error {}",
                error
            );
            Ok(sequence.clone())
        }
    }
}

fn assert_linearized(sequence: &Sequence<usize, ()>) -> Result<(), TestCaseError> {
    let nodes = sequence.nodes();
    let mut seen = HashSet::new();
    for (index, node) in nodes.iter().enumerate() {
        prop_assert!(seen.insert(*node.id()), "duplicate {}", node.id());

        let parent_index = node
            .parent()
            .and_then(|parent| nodes.iter().position(|other| other.id() == parent));
        match parent_index {
            None => {
                prop_assert_eq!(node.depth(), 0);
                prop_assert!(!node.is_hidden());
            }
            Some(parent_index) => {
                let parent = &nodes[parent_index];
                prop_assert!(parent_index < index, "{} is before its parent", node.id());
                prop_assert_eq!(node.depth(), parent.depth() + 1);
                prop_assert_eq!(
                    node.is_hidden(),
                    parent.is_hidden() || parent.is_collapsed()
                );
                for between in &nodes[parent_index + 1..index] {
                    prop_assert!(
                        between.depth() > parent.depth(),
                        "{} interrupts the subtree of {}",
                        between.id(),
                        parent.id()
                    );
                }
            }
        }
    }
    Ok(())
}

fn ids(sequence: &Sequence<usize, ()>) -> HashSet<usize> {
    sequence.iter().map(|node| *node.id()).collect()
}

proptest! {
    #[test]
    fn new_sequence_is_linearized(nodes in forest(40, false)) {
        let amount = nodes.len();
        let sequence = Sequence::new(nodes).unwrap();
        prop_assert_eq!(sequence.len(), amount);
        assert_linearized(&sequence)?;
        prop_assert!(sequence.orphans().is_empty());
        prop_assert_eq!(sequence.sort().unwrap(), sequence);
    }

    #[test]
    fn operations_keep_sequence_linearized(
        nodes in forest(30, true),
        operations in prop::collection::vec(operation(), 1..20),
    ) {
        let mut sequence = Sequence::new(nodes).unwrap();
        let before = ids(&sequence);
        for operation in &operations {
            sequence = apply(&sequence, operation)?;
            assert_linearized(&sequence)?;
            prop_assert_eq!(&ids(&sequence), &before);
        }
        prop_assert_eq!(sequence.sort().unwrap(), sequence);
    }

    #[test]
    fn orphans_are_placed_as_roots(nodes in forest(40, true)) {
        let declared = nodes
            .iter()
            .filter(|node| node.parent().is_some_and(|parent| *parent >= MISSING))
            .count();
        let sequence = Sequence::new(nodes).unwrap();
        assert_linearized(&sequence)?;
        prop_assert_eq!(sequence.orphans().len(), declared);
        for orphan in sequence.orphans() {
            prop_assert_eq!(orphan.depth(), 0);
            prop_assert!(!orphan.is_hidden());
        }
    }

    #[test]
    fn moves_only_reject_cycles(
        nodes in forest(30, true),
        source in any::<Index>(),
        destination in any::<Index>(),
    ) {
        let sequence = Sequence::new(nodes).unwrap();
        let source = source.index(sequence.len());
        let destination = destination.index(sequence.len());
        match sequence.move_node(source, destination) {
            Ok((moved, _)) => assert_linearized(&moved)?,
            Err(error) => prop_assert!(
                matches!(error, Error::CycleRejected { .. }),
                "unexpected error {}",
                error
            ),
        }
    }

    #[test]
    fn collapse_then_expand_is_expand(nodes in forest(30, true), index in any::<Index>()) {
        let sequence = Sequence::new(nodes).unwrap();
        let id = id_at(&sequence, &index);
        let roundtrip = sequence.collapse(&id).unwrap().expand(&id).unwrap();
        prop_assert_eq!(roundtrip, sequence.expand(&id).unwrap());
    }

    #[test]
    fn resolved_leaf_lands_at_destination(
        nodes in forest(30, true),
        source in any::<Index>(),
        destination in any::<Index>(),
    ) {
        let sequence = Sequence::new(nodes).unwrap();
        let source = source.index(sequence.len());
        let destination = destination.index(sequence.len());
        let moved = *sequence.nodes()[source].id();
        prop_assume!(!sequence.has_children(&moved).unwrap());

        let (next, reparent) = sequence.move_node(source, destination).unwrap();
        prop_assume!(reparent != Reparent::Unresolved);
        prop_assert_eq!(*next.nodes()[destination].id(), moved);
    }

    #[test]
    fn order_keys_are_increasing(nodes in forest(40, true), start in 0u64..100, step in 1u64..100) {
        let sequence = Sequence::new(nodes).unwrap();
        let records = OrderKeys::new(start, step).records(&sequence);
        prop_assert_eq!(records.len(), sequence.len());
        prop_assert_eq!(records[0].order, start);
        for pair in records.windows(2) {
            prop_assert_eq!(pair[1].order, pair[0].order + step);
        }
    }
}
