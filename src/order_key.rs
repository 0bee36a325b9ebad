use crate::sequence::Sequence;

/// Sparse order keys for persisting a [`Sequence`].
///
/// The node at flat position `index` gets the key `index * step + start`.
/// The gaps allow inserting single nodes later on without renumbering all of their siblings.
///
/// # Example
///
/// ```
/// # use tree_table::OrderKeys;
/// let keys = OrderKeys::default();
/// assert_eq!(keys.key(0), 10);
/// assert_eq!(keys.key(2), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKeys {
    start: u64,
    step: u64,
}

impl Default for OrderKeys {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl OrderKeys {
    #[must_use]
    pub const fn new(start: u64, step: u64) -> Self {
        Self { start, step }
    }

    #[must_use]
    pub const fn start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub const fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Order key of the flat position.
    #[must_use]
    pub const fn key(&self, index: usize) -> u64 {
        (index as u64)
            .saturating_mul(self.step)
            .saturating_add(self.start)
    }

    /// One record per node in flat order.
    ///
    /// Only identifier, parent and order key are part of a record.
    /// Depth, visibility, collapsed state and fields are local presentation state.
    #[must_use]
    pub fn records<Identifier, Fields>(
        &self,
        sequence: &Sequence<Identifier, Fields>,
    ) -> Vec<OrderRecord<Identifier>>
    where
        Identifier: Clone,
    {
        sequence
            .iter()
            .enumerate()
            .map(|(index, node)| OrderRecord {
                id: node.id.clone(),
                parent_id: node.parent.clone(),
                order: self.key(index),
            })
            .collect()
    }
}

/// What gets persisted of a node after a structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "camelCase"))]
pub struct OrderRecord<Identifier> {
    pub id: Identifier,
    pub parent_id: Option<Identifier>,
    pub order: u64,
}

/// Storage for the order of the nodes, for example an HTTP endpoint of the host application.
///
/// Called after every move or combine with the records of all nodes.
/// Nothing is retried: when storing fails the local state has to be replaced by a reload from the source of truth.
pub trait Persistence<Identifier> {
    type Error: std::fmt::Display;

    /// Store the batch of records.
    ///
    /// # Errors
    ///
    /// Any failure of the storage. The response is not interpreted beyond success or failure.
    fn persist(&mut self, records: Vec<OrderRecord<Identifier>>) -> Result<(), Self::Error>;
}

impl<Identifier, Function, Error> Persistence<Identifier> for Function
where
    Function: FnMut(Vec<OrderRecord<Identifier>>) -> Result<(), Error>,
    Error: std::fmt::Display,
{
    type Error = Error;

    fn persist(&mut self, records: Vec<OrderRecord<Identifier>>) -> Result<(), Self::Error> {
        self(records)
    }
}

/// Result of handing a change to the [`Persistence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// The change was local presentation state only (collapse / expand).
    Skipped,
    Stored,
    /// Storing failed. Discard the local sequence and reload it from the source of truth.
    ReloadRequired,
}

#[test]
fn flat_roots_get_sparse_keys() {
    use crate::node::Node;
    let sequence = Sequence::new(vec![
        Node::root("a", ()),
        Node::root("b", ()),
        Node::root("c", ()),
    ])
    .unwrap();
    let orders = OrderKeys::default()
        .records(&sequence)
        .into_iter()
        .map(|record| record.order)
        .collect::<Vec<_>>();
    assert_eq!(orders, [10, 20, 30]);
}

#[test]
fn records_carry_parents() {
    let records = OrderKeys::default().records(&Sequence::example());
    assert_eq!(
        records[4],
        OrderRecord {
            id: "e",
            parent_id: Some("d"),
            order: 50,
        }
    );
    assert_eq!(records[7].parent_id, None);
}

#[test]
fn custom_scheme() {
    let keys = OrderKeys::default().start(0).step(100);
    assert_eq!(keys.key(0), 0);
    assert_eq!(keys.key(3), 300);
    assert_eq!(OrderKeys::new(10, u64::MAX).key(2), u64::MAX);
}

#[cfg(feature = "json")]
#[test]
fn record_serializes_camel_case() {
    let record = OrderRecord {
        id: "b",
        parent_id: Some("a"),
        order: 20,
    };
    let json = serde_json::to_value(record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": "b", "parentId": "a", "order": 20})
    );
}
