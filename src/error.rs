/// Everything that can go wrong when building or changing a [`Sequence`](crate::Sequence).
///
/// A failed operation never changes the sequence it was called on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<Identifier> {
    /// The input collection can not be linearized.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The referenced identifier does not exist in the sequence.
    #[error("node {0:?} not found")]
    NotFound(Identifier),

    /// A flat position outside of the sequence.
    #[error("position {index} is out of range for a sequence of {len} nodes")]
    PositionOutOfRange { index: usize, len: usize },

    /// Nesting `node` below `parent` would make it its own ancestor.
    #[error("nesting {node:?} below {parent:?} would create a cycle")]
    CycleRejected { node: Identifier, parent: Identifier },
}

pub type Result<T, Identifier> = std::result::Result<T, Error<Identifier>>;

#[test]
fn messages() {
    let error = Error::NotFound("a");
    assert_eq!(error.to_string(), r#"node "a" not found"#);

    let error = Error::CycleRejected {
        node: 1,
        parent: 2,
    };
    assert_eq!(error.to_string(), "nesting 1 below 2 would create a cycle");

    let error = Error::<u8>::PositionOutOfRange { index: 5, len: 3 };
    assert_eq!(
        error.to_string(),
        "position 5 is out of range for a sequence of 3 nodes"
    );
}
