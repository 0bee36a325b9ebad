use crate::gesture::Applied;
use crate::order_key::{OrderKeys, Persisted, Persistence};

/// A displayed column of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Key in the fields of a row.
    pub name: String,
    /// Text of the header.
    pub title: String,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }

    /// Parse a comma separated list of `name:title` definitions.
    ///
    /// A definition without title uses its name as title.
    /// Empty definitions are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// # use tree_table::Column;
    /// let columns = Column::parse_list("title:Title, author");
    /// assert_eq!(columns, [Column::new("title", "Title"), Column::new("author", "author")]);
    /// ```
    #[must_use]
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|definition| !definition.is_empty())
            .map(|definition| match definition.split_once(':') {
                Some((name, title)) => Self::new(name.trim(), title.trim()),
                None => Self::new(definition, definition),
            })
            .collect()
    }
}

/// Sort direction requested from the rows source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Configuration of a tree table: what to fetch, what to show and how to persist the order.
///
/// # Example
///
/// ```
/// # use tree_table::{Column, SortOrder, TableConfig};
/// let config = TableConfig::new(Column::parse_list("title:Title"))
///     .rows_url("/api/rows")
///     .sort_field("title")
///     .sort_order(SortOrder::Desc);
/// assert_eq!(config.query(), [("sort", "title".to_owned()), ("order", "desc".to_owned())]);
/// ```
#[must_use]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows_url: Option<String>,
    pub(crate) sort_field: Option<String>,
    pub(crate) sort_order: SortOrder,
    pub(crate) order_keys: OrderKeys,
}

impl TableConfig {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn rows_url(mut self, url: impl Into<String>) -> Self {
        self.rows_url = Some(url.into());
        self
    }

    pub fn sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn order_keys(mut self, keys: OrderKeys) -> Self {
        self.order_keys = keys;
        self
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn get_rows_url(&self) -> Option<&str> {
        self.rows_url.as_deref()
    }

    #[must_use]
    pub const fn get_order_keys(&self) -> &OrderKeys {
        &self.order_keys
    }

    /// Persist an applied gesture with the configured [`OrderKeys`].
    ///
    /// ```
    /// # use tree_table::{Gesture, Node, OrderKeys, OrderRecord, Persisted, Sequence, TableConfig};
    /// let sequence = Sequence::new(vec![Node::root("a", ()), Node::root("b", ())])?;
    /// let applied = sequence.apply(&Gesture::Nest { source_id: "b", destination_id: "a" })?;
    ///
    /// let config = TableConfig::default().order_keys(OrderKeys::new(100, 100));
    /// let mut stored = Vec::new();
    /// let persisted = config.persist(&applied, &mut |records: Vec<OrderRecord<&'static str>>| {
    ///     stored = records;
    ///     Ok::<(), String>(())
    /// });
    /// assert_eq!(persisted, Persisted::Stored);
    /// assert_eq!(stored[1].order, 200);
    /// # Ok::<(), tree_table::Error<&str>>(())
    /// ```
    pub fn persist<Identifier, Fields, P>(
        &self,
        applied: &Applied<Identifier, Fields>,
        persistence: &mut P,
    ) -> Persisted
    where
        Identifier: Clone + core::fmt::Debug,
        P: Persistence<Identifier>,
    {
        applied.persist(&self.order_keys, persistence)
    }

    /// Request parameters for fetching the rows.
    ///
    /// `sort` is only present when a sort field is configured.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(2);
        if let Some(field) = &self.sort_field {
            query.push(("sort", field.clone()));
        }
        query.push(("order", self.sort_order.as_str().to_owned()));
        query
    }
}

#[test]
fn parse_list_skips_empty() {
    let columns = Column::parse_list("a:A,,b:B:extra, ");
    assert_eq!(
        columns,
        [Column::new("a", "A"), Column::new("b", "B:extra")]
    );
    assert!(Column::parse_list("").is_empty());
}

#[test]
fn default_query_is_ascending() {
    let config = TableConfig::default();
    assert_eq!(config.query(), [("order", "asc".to_owned())]);
    assert_eq!(config.get_order_keys(), &OrderKeys::default());
    assert_eq!(config.get_rows_url(), None);
}

#[test]
fn persist_uses_configured_order_keys() {
    use crate::gesture::Gesture;
    use crate::order_key::OrderRecord;
    use crate::sequence::Sequence;

    let config = TableConfig::default().order_keys(OrderKeys::new(5, 5));
    let applied = Sequence::example()
        .apply(&Gesture::Reorder {
            source_index: 0,
            destination_index: 1,
        })
        .unwrap();

    let mut orders: Vec<u64> = Vec::new();
    let mut persistence = |records: Vec<OrderRecord<&str>>| -> std::result::Result<(), String> {
        orders.extend(records.iter().map(|record| record.order));
        Ok(())
    };
    assert_eq!(config.persist(&applied, &mut persistence), Persisted::Stored);
    assert_eq!(orders, [5, 10, 15, 20, 25, 30, 35, 40]);
}
