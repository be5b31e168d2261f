//! Errors reported by the list and its allocators.

use thiserror::Error;

/// A [`NodeAllocator`](crate::NodeAllocator) refused to provide storage for a
/// new node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("node allocator refused a block of {slots} slots")]
pub struct AllocError {
    slots: usize,
}

impl AllocError {
    pub fn new(slots: usize) -> Self {
        Self { slots }
    }

    /// The number of element slots that was requested.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

/// Failures of positional and allocating list operations.
///
/// Whenever one of these is returned the list is exactly as it was before the
/// call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ListError {
    /// The position is a placeholder on a non-empty list, or names a node
    /// that has been destroyed, merged away, or belongs to another list.
    #[error("position does not name a live node of this list")]
    InvalidPosition,
    /// The position names a live node but points past its elements.
    #[error("in-node index {index} is out of range for a node of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },
    /// A logical index or a cursor step left the list.
    #[error("index {index} is out of bounds for a list of {len} elements")]
    OutOfBounds { index: usize, len: usize },
    /// The end of a range is not reachable from its start.
    #[error("range end precedes range start")]
    InvalidRange,
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Failure of an operation fed by a fallible element source.
#[derive(Debug, Error)]
pub enum TryExtendError<E> {
    /// The source yielded an error; nothing was inserted.
    #[error("element source failed: {0}")]
    Source(E),
    #[error(transparent)]
    List(#[from] ListError),
}

/// A structural defect found by
/// [`UnrolledList::validate_invariants`](crate::UnrolledList::validate_invariants).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("node in slot {slot} is linked but empty")]
    EmptyNode { slot: usize },
    #[error("node in slot {slot} holds {len} elements, more than its capacity")]
    Overfull { slot: usize, len: usize },
    #[error("link between slots {from} and {to} is not mirrored")]
    BrokenLink { from: usize, to: usize },
    #[error("first/last boundary does not match the chain")]
    BoundaryMismatch,
    #[error("chain does not terminate")]
    Cycle,
    #[error("list counts {recorded} elements but its nodes hold {actual}")]
    CountMismatch { recorded: usize, actual: usize },
    #[error("{live} nodes are allocated but only {linked} are linked")]
    OrphanedNodes { live: usize, linked: usize },
}
