//! Node allocation policies.
//!
//! An [`UnrolledList`] never asks the allocator for element storage directly.
//! Every node owns a fixed block of `K` slots, and the list asks its
//! [`NodeAllocator`] for permission to create such a block before it does so,
//! and reports the block back once the node is destroyed. Constructing and
//! destroying elements inside a block is done by the node itself.
//!
//! [`UnrolledList`]: crate::UnrolledList

use std::cell::Cell;
use std::rc::Rc;

use crate::error::AllocError;

/// The allocator contract an [`UnrolledList`](crate::UnrolledList) relies on.
///
/// `allocate` may refuse, in which case the list leaves itself exactly as it
/// was before the call that needed a new node. `deallocate` must not fail.
pub trait NodeAllocator {
    /// Reserve storage for one node of `slots` element slots.
    fn allocate(&mut self, slots: usize) -> Result<(), AllocError>;

    /// Release storage previously reserved by [`NodeAllocator::allocate`].
    fn deallocate(&mut self, slots: usize);
}

/// The default allocator, backed by the global heap. It never refuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl NodeAllocator for Global {
    #[inline]
    fn allocate(&mut self, _slots: usize) -> Result<(), AllocError> {
        Ok(())
    }

    #[inline]
    fn deallocate(&mut self, _slots: usize) {}
}

/// A snapshot of the node traffic seen by a [`CountingAllocator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub allocations: usize,
    pub deallocations: usize,
    pub slots_allocated: usize,
    pub slots_deallocated: usize,
}

impl AllocStats {
    /// Nodes currently alive.
    pub fn live_nodes(&self) -> usize {
        self.allocations - self.deallocations
    }
}

/// An allocator that records every node allocation and deallocation.
///
/// Clones share the same record, so a handle kept outside the list keeps
/// observing it after the list has been moved, assigned or swapped.
///
/// # Examples
///
/// ```
/// use unrolled_list::{CountingAllocator, UnrolledList};
///
/// let alloc = CountingAllocator::new();
/// let mut list: UnrolledList<i32, 5, _> = UnrolledList::new_in(alloc.clone());
/// list.extend(0..11);
/// assert_eq!(alloc.stats().allocations, 3);
///
/// drop(list);
/// assert_eq!(alloc.stats().deallocations, 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CountingAllocator {
    stats: Rc<Cell<AllocStats>>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        self.stats.set(AllocStats::default());
    }
}

impl NodeAllocator for CountingAllocator {
    fn allocate(&mut self, slots: usize) -> Result<(), AllocError> {
        let mut stats = self.stats.get();
        stats.allocations += 1;
        stats.slots_allocated += slots;
        self.stats.set(stats);
        Ok(())
    }

    fn deallocate(&mut self, slots: usize) {
        let mut stats = self.stats.get();
        stats.deallocations += 1;
        stats.slots_deallocated += slots;
        self.stats.set(stats);
    }
}

/// An allocator with a fixed budget of live nodes.
///
/// Once `max_nodes` nodes are alive every further allocation is refused
/// until some node is released. Clones share the budget.
///
/// # Examples
///
/// ```
/// use unrolled_list::{BoundedAllocator, UnrolledList};
///
/// let mut list: UnrolledList<i32, 2, _> = UnrolledList::new_in(BoundedAllocator::new(1));
/// assert!(list.try_push_back(1).is_ok());
/// assert!(list.try_push_back(2).is_ok());
/// assert!(list.try_push_back(3).is_err()); // would need a second node
/// assert_eq!(list.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct BoundedAllocator {
    max_nodes: usize,
    live: Rc<Cell<usize>>,
}

impl BoundedAllocator {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            live: Rc::new(Cell::new(0)),
        }
    }

    pub fn live_nodes(&self) -> usize {
        self.live.get()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Change the budget. Nodes already alive are not affected.
    pub fn set_max_nodes(&mut self, max_nodes: usize) {
        self.max_nodes = max_nodes;
    }
}

impl NodeAllocator for BoundedAllocator {
    fn allocate(&mut self, slots: usize) -> Result<(), AllocError> {
        let live = self.live.get();
        if live >= self.max_nodes {
            return Err(AllocError::new(slots));
        }
        self.live.set(live + 1);
        Ok(())
    }

    fn deallocate(&mut self, _slots: usize) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}
