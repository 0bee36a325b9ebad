use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::order_key::{OrderKeys, OrderRecord, Persisted, Persistence};
use crate::reorder::Reparent;
use crate::sequence::Sequence;

/// A user gesture reported by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture<Identifier> {
    Collapse(Identifier),
    Expand(Identifier),
    /// Drag reorder by flat position.
    Reorder {
        source_index: usize,
        destination_index: usize,
    },
    /// Drag one node onto another one.
    Nest {
        source_id: Identifier,
        destination_id: Identifier,
    },
}

/// The raw outcome of a drag as drag and drop surfaces report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult<Identifier> {
    /// Flat position the drag started at.
    pub source_index: usize,
    /// Flat position the node was dropped at. `None` when it was dropped outside.
    pub destination_index: Option<usize>,
    /// The node it was dropped onto.
    pub combine: Option<Identifier>,
}

impl<Identifier> Gesture<Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    /// Translate a [`DragResult`] into a gesture.
    ///
    /// A drop onto another node is a [`Gesture::Nest`] even when a destination position is given.
    /// Returns `None` when the node was dropped outside.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfRange`] when the source position is not within the sequence.
    pub fn from_drag<Fields>(
        sequence: &Sequence<Identifier, Fields>,
        drag: DragResult<Identifier>,
    ) -> Result<Option<Self>, Identifier> {
        let DragResult {
            source_index,
            destination_index,
            combine,
        } = drag;

        if let Some(destination_id) = combine {
            let source = sequence
                .get(source_index)
                .ok_or(Error::PositionOutOfRange {
                    index: source_index,
                    len: sequence.len(),
                })?;
            return Ok(Some(Self::Nest {
                source_id: source.id.clone(),
                destination_id,
            }));
        }

        Ok(destination_index.map(|destination_index| Self::Reorder {
            source_index,
            destination_index,
        }))
    }

    /// Moves and nests change the tree and have to be persisted.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Reorder { .. } | Self::Nest { .. })
    }
}

/// The outcome of [`Sequence::apply`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<Identifier, Fields> {
    pub sequence: Sequence<Identifier, Fields>,
    /// Whether the tree structure changed and has to be persisted.
    pub structural: bool,
    /// How the parent of a moved node was decided. Only set for [`Gesture::Reorder`].
    pub reparent: Option<Reparent<Identifier>>,
}

impl<Identifier, Fields> Applied<Identifier, Fields>
where
    Identifier: Clone + core::fmt::Debug,
{
    /// Records to persist, `None` for changes of local presentation state only.
    #[must_use]
    pub fn order_records(&self, keys: &OrderKeys) -> Option<Vec<OrderRecord<Identifier>>> {
        self.structural.then(|| keys.records(&self.sequence))
    }

    /// Hand the order records to the `persistence`.
    ///
    /// A failure is logged and reported as [`Persisted::ReloadRequired`].
    /// The new sequence is not rolled back: the caller replaces it with a reload from the source of truth.
    pub fn persist<P>(&self, keys: &OrderKeys, persistence: &mut P) -> Persisted
    where
        P: Persistence<Identifier>,
    {
        let Some(records) = self.order_records(keys) else {
            return Persisted::Skipped;
        };
        let amount = records.len();
        match persistence.persist(records) {
            Ok(()) => {
                debug!(amount, "persisted order");
                Persisted::Stored
            }
            Err(err) => {
                error!(%err, "persisting the order failed, reload required");
                Persisted::ReloadRequired
            }
        }
    }
}

impl<Identifier, Fields> Sequence<Identifier, Fields>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
    Fields: Clone,
{
    /// Apply a [`Gesture`] and return the next sequence.
    ///
    /// # Errors
    ///
    /// The errors of the operation the gesture maps to:
    /// [`collapse`](Self::collapse), [`expand`](Self::expand), [`move_node`](Self::move_node) or [`combine`](Self::combine).
    pub fn apply(
        &self,
        gesture: &Gesture<Identifier>,
    ) -> Result<Applied<Identifier, Fields>, Identifier> {
        debug!(?gesture, "applying gesture");
        let structural = gesture.is_structural();
        let applied = match gesture {
            Gesture::Collapse(id) => Applied {
                sequence: self.collapse(id)?,
                structural,
                reparent: None,
            },
            Gesture::Expand(id) => Applied {
                sequence: self.expand(id)?,
                structural,
                reparent: None,
            },
            Gesture::Reorder {
                source_index,
                destination_index,
            } => {
                let (sequence, reparent) = self.move_node(*source_index, *destination_index)?;
                Applied {
                    sequence,
                    structural,
                    reparent: Some(reparent),
                }
            }
            Gesture::Nest {
                source_id,
                destination_id,
            } => Applied {
                sequence: self.combine(source_id, destination_id)?,
                structural,
                reparent: None,
            },
        };
        Ok(applied)
    }
}

#[test]
fn drop_outside_is_nothing() {
    let drag = DragResult {
        source_index: 2,
        destination_index: None,
        combine: None,
    };
    assert_eq!(Gesture::from_drag(&Sequence::example(), drag), Ok(None));
}

#[test]
fn drop_on_position_is_reorder() {
    let drag = DragResult {
        source_index: 2,
        destination_index: Some(5),
        combine: None,
    };
    assert_eq!(
        Gesture::from_drag(&Sequence::example(), drag),
        Ok(Some(Gesture::Reorder {
            source_index: 2,
            destination_index: 5
        }))
    );
}

#[test]
fn drop_on_node_is_nest() {
    let drag = DragResult {
        source_index: 0,
        destination_index: Some(3),
        combine: Some("d"),
    };
    assert_eq!(
        Gesture::from_drag(&Sequence::example(), drag),
        Ok(Some(Gesture::Nest {
            source_id: "a",
            destination_id: "d"
        }))
    );
}

#[test]
fn nest_from_unknown_position() {
    let drag = DragResult {
        source_index: 8,
        destination_index: None,
        combine: Some("d"),
    };
    assert_eq!(
        Gesture::from_drag(&Sequence::example(), drag),
        Err(Error::PositionOutOfRange { index: 8, len: 8 })
    );
}

#[test]
fn collapse_is_not_persisted() {
    let applied = Sequence::example().apply(&Gesture::Collapse("b")).unwrap();
    assert!(!applied.structural);
    assert_eq!(applied.order_records(&OrderKeys::default()), None);

    let mut batches: Vec<Vec<OrderRecord<&str>>> = Vec::new();
    let mut persistence = |records| -> std::result::Result<(), String> {
        batches.push(records);
        Ok(())
    };
    assert_eq!(
        applied.persist(&OrderKeys::default(), &mut persistence),
        Persisted::Skipped
    );
    assert!(batches.is_empty());
}

#[test]
fn reorder_is_persisted() {
    let gesture = Gesture::Reorder {
        source_index: 7,
        destination_index: 0,
    };
    let applied = Sequence::example().apply(&gesture).unwrap();
    assert_eq!(applied.reparent, Some(Reparent::Unresolved));

    let mut batches: Vec<Vec<OrderRecord<&str>>> = Vec::new();
    let mut persistence = |records| -> std::result::Result<(), String> {
        batches.push(records);
        Ok(())
    };
    assert_eq!(
        applied.persist(&OrderKeys::default(), &mut persistence),
        Persisted::Stored
    );
    assert_eq!(batches.len(), 1);
    let first = &batches[0][0];
    assert_eq!(
        first,
        &OrderRecord {
            id: "h",
            parent_id: None,
            order: 10
        }
    );
}

#[test]
fn failing_persistence_requires_reload() {
    let gesture = Gesture::Nest {
        source_id: "a",
        destination_id: "h",
    };
    let applied = Sequence::example().apply(&gesture).unwrap();
    let mut persistence =
        |_records: Vec<OrderRecord<&str>>| Err::<(), _>("connection refused".to_owned());
    assert_eq!(
        applied.persist(&OrderKeys::default(), &mut persistence),
        Persisted::ReloadRequired
    );
}
