use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// One row of the hierarchy inside a [`Sequence`](crate::Sequence).
///
/// A node references its parent by identifier instead of owning its children.
/// `depth` and `hidden` are derived from the parent chain and are only ever written by the [`Sequence`](crate::Sequence) operations.
///
/// # Identifier
///
/// The generic argument `Identifier` has to be unique among all nodes of a [`Sequence`](crate::Sequence).
/// It does not need to be a `String`, database ids as `u64` work just as well.
///
/// # Fields
///
/// The generic argument `Fields` is owned by the caller and passed through untouched.
/// The [`TreeTable`](crate::TreeTable) widget reads display cells out of it via [`RowFields`].
///
/// # Example
///
/// ```
/// # use tree_table::Node;
/// let root = Node::root("r", ());
/// let leaf = Node::new("l", Some("r"), ());
/// assert_eq!(leaf.parent(), Some(&"r"));
/// assert!(root.is_root());
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<Identifier, Fields> {
    pub(crate) id: Identifier,
    pub(crate) parent: Option<Identifier>,
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    pub(crate) depth: usize,
    pub(crate) collapsed: bool,
    pub(crate) hidden: bool,
    pub(crate) fields: Fields,
}

impl<Identifier, Fields> Node<Identifier, Fields> {
    /// Create a new `Node` below the given parent or as root when `parent` is `None`.
    pub const fn new(id: Identifier, parent: Option<Identifier>, fields: Fields) -> Self {
        Self {
            id,
            parent,
            depth: 0,
            collapsed: false,
            hidden: false,
            fields,
        }
    }

    /// Create a new `Node` without parent.
    pub const fn root(id: Identifier, fields: Fields) -> Self {
        Self::new(id, None, fields)
    }

    /// Set the initial collapsed state, for example when restoring a previously persisted view.
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    #[must_use]
    pub const fn id(&self) -> &Identifier {
        &self.id
    }

    /// The declared parent.
    ///
    /// This is kept as given even when the parent does not exist in the [`Sequence`](crate::Sequence).
    /// Such orphans are placed as roots, see [`Sequence::orphans`](crate::Sequence::orphans).
    #[must_use]
    pub const fn parent(&self) -> Option<&Identifier> {
        self.parent.as_ref()
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// `true` when at least one ancestor is collapsed.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

/// Access to the displayable cells of a [`Node`]s fields.
///
/// Implemented for the common map types.
/// Implement it for your own row type to render it with the [`TreeTable`](crate::TreeTable) widget.
pub trait RowFields {
    /// The text of the given column or `None` when the row has no value for it.
    fn cell(&self, column: &str) -> Option<Cow<'_, str>>;
}

impl RowFields for () {
    fn cell(&self, _column: &str) -> Option<Cow<'_, str>> {
        None
    }
}

impl RowFields for BTreeMap<String, String> {
    fn cell(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl<S: std::hash::BuildHasher> RowFields for HashMap<String, String, S> {
    fn cell(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).map(|value| Cow::Borrowed(value.as_str()))
    }
}

#[test]
fn new_node_is_expanded_and_visible() {
    let node = Node::new(2, Some(1), ());
    assert_eq!(node.depth(), 0);
    assert!(!node.is_collapsed());
    assert!(!node.is_hidden());
    assert!(!node.is_root());
}

#[test]
fn btreemap_cells() {
    let mut fields = BTreeMap::new();
    fields.insert("title".to_owned(), "Hello".to_owned());
    assert_eq!(fields.cell("title").as_deref(), Some("Hello"));
    assert_eq!(fields.cell("author"), None);
}
