use std::fmt::{Debug, Formatter};
use std::mem;

use tracing::{debug, trace};

use crate::alloc::{Global, NodeAllocator};
use crate::error::{AllocError, InvariantError, ListError, TryExtendError};
use crate::list::arena::Arena;
use crate::list::cursor::{Cursor, CursorMut, Position};
use crate::{IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;
pub mod node;

mod algorithms;
mod arena;
mod rebalance;

/// Node capacity used when none is given.
pub const DEFAULT_NODE_CAPACITY: usize = 10;

/// A resolved location: the slot of a live node (or `None` on an empty list)
/// and a logical index inside that node, `0..=len`.
pub(crate) type Loc = (Option<usize>, usize);

/// The `UnrolledList` is a sequence container storing its elements in a
/// doubly-linked chain of [`Node`](node::Node)s, each a circular buffer of at
/// most `K` elements.
///
/// Insertion and removal at a known [`Position`] touch a single node (plus
/// at most one neighbour when the node has to be split, merged or refilled),
/// while elements stay packed in arrays for cheap iteration. Reaching a
/// logical index walks the chain node by node, in *O*(*n*/`K`) time.
///
/// The list contains:
/// - an arena owning every node, addressed by integer slot handles;
/// - the slots of the `first` and `last` node (both `None` iff the list is
///   empty);
/// - the element count `len`, equal to the sum of all node lengths;
/// - the node allocator `A`, consulted before every node is created.
///
/// After every operation that removes an element, the touched node holds at
/// least `K - K/2` elements unless it is the only node of the list. Nodes are
/// never left empty.
///
/// # Naming Conventions
///
/// - a *position* is an opaque, copyable value naming a node and an index in
///   it; the past-the-end position is `(last, len(last))`;
/// - `first..last` is a half-open range of positions.
pub struct UnrolledList<T, const K: usize = DEFAULT_NODE_CAPACITY, A: NodeAllocator = Global> {
    arena: Arena<T, K>,
    first: Option<usize>,
    last: Option<usize>,
    len: usize,
    alloc: A,
}

// private methods
impl<T, const K: usize, A: NodeAllocator> UnrolledList<T, K, A> {
    /// Asks the allocator for a node and parks it, unlinked, in the arena.
    fn create_node(&mut self) -> Result<usize, AllocError> {
        if let Err(err) = self.alloc.allocate(K) {
            debug!(capacity = K, nodes = self.arena.live(), "node allocation refused");
            return Err(err);
        }
        let slot = self.arena.insert(node::Node::new());
        trace!(slot, "allocated node");
        Ok(slot)
    }

    /// Hands out a node from `spare` when there is one left, otherwise asks
    /// the allocator.
    fn acquire_node(&mut self, spare: &mut Vec<usize>) -> Result<usize, AllocError> {
        match spare.pop() {
            Some(slot) => Ok(slot),
            None => self.create_node(),
        }
    }

    /// Allocates `count` unlinked nodes, or none at all.
    fn reserve_nodes(&mut self, count: usize) -> Result<Vec<usize>, AllocError> {
        let mut spare = Vec::with_capacity(count);
        for _ in 0..count {
            match self.create_node() {
                Ok(slot) => spare.push(slot),
                Err(err) => {
                    debug!(count, reserved = spare.len(), "releasing partial node reservation");
                    self.release_nodes(spare);
                    return Err(err);
                }
            }
        }
        Ok(spare)
    }

    fn release_nodes(&mut self, spare: Vec<usize>) {
        for slot in spare {
            self.destroy_node(slot);
        }
    }

    /// Destroys an unlinked node together with whatever it still holds.
    fn destroy_node(&mut self, slot: usize) {
        if let Some(node) = self.arena.remove(slot) {
            self.alloc.deallocate(K);
            trace!(slot, "released node");
            drop(node);
        }
    }

    /// Links the unlinked node `slot` right after `prev`, or at the front
    /// when `prev` is `None`.
    fn link_after(&mut self, slot: usize, prev: Option<usize>) {
        let next = match prev {
            Some(prev) => self.arena[prev].next,
            None => self.first,
        };
        {
            let node = &mut self.arena[slot];
            node.prev = prev;
            node.next = next;
        }
        match prev {
            Some(prev) => self.arena[prev].next = Some(slot),
            None => self.first = Some(slot),
        }
        match next {
            Some(next) => self.arena[next].prev = Some(slot),
            None => self.last = Some(slot),
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &mut self.arena[slot];
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.arena[prev].next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.arena[next].prev = prev,
            None => self.last = prev,
        }
    }

    fn begin_loc(&self) -> Loc {
        (self.first, 0)
    }

    fn end_loc(&self) -> Loc {
        match self.last {
            Some(last) => (Some(last), self.arena[last].len()),
            None => (None, 0),
        }
    }

    /// Rewrites `(node, len(node))` of a non-last node as `(next, 0)`.
    fn normalize(&self, (slot, index): Loc) -> Loc {
        match slot {
            Some(slot) if index == self.arena[slot].len() => match self.arena[slot].next {
                Some(next) => (Some(next), 0),
                None => (Some(slot), index),
            },
            _ => (slot, index),
        }
    }

    fn to_position(&self, (slot, index): Loc) -> Position {
        Position {
            node: slot.map(|slot| self.arena.node_ref(slot)),
            index,
        }
    }

    /// Resolves any position of this list, including the past-the-end one.
    fn locate(&self, pos: Position) -> Result<Loc, ListError> {
        match pos.node {
            None if self.is_empty() && pos.index == 0 => Ok((None, 0)),
            None => Err(ListError::InvalidPosition),
            Some(node) => {
                let slot = self.arena.resolve(node).ok_or(ListError::InvalidPosition)?;
                let len = self.arena[slot].len();
                if pos.index > len {
                    return Err(ListError::IndexOutOfRange {
                        index: pos.index,
                        len,
                    });
                }
                Ok((Some(slot), pos.index))
            }
        }
    }

    /// Resolves a position that must name an element.
    fn locate_element(&self, pos: Position) -> Result<(usize, usize), ListError> {
        match self.normalize(self.locate(pos)?) {
            (Some(slot), index) if index < self.arena[slot].len() => Ok((slot, index)),
            (Some(slot), index) => Err(ListError::IndexOutOfRange {
                index,
                len: self.arena[slot].len(),
            }),
            (None, index) => Err(ListError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// The location of the element at logical `index`, walking from the
    /// nearer end.
    fn loc_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        if index <= self.len / 2 {
            let mut index = index;
            let mut current = self.first;
            while let Some(slot) = current {
                let node = &self.arena[slot];
                if index < node.len() {
                    return Some((slot, index));
                }
                index -= node.len();
                current = node.next;
            }
        } else {
            let mut from_back = self.len - index;
            let mut current = self.last;
            while let Some(slot) = current {
                let node = &self.arena[slot];
                if from_back <= node.len() {
                    return Some((slot, node.len() - from_back));
                }
                from_back -= node.len();
                current = node.prev;
            }
        }
        None
    }

    /// One step towards the back. Element locations step to the next element
    /// or to the end; the end does not move.
    pub(crate) fn step_forward(&self, (slot, index): Loc) -> Loc {
        let Some(slot) = slot else {
            return (None, 0);
        };
        let node = &self.arena[slot];
        if index + 1 < node.len() {
            return (Some(slot), index + 1);
        }
        match node.next {
            Some(next) if index < node.len() => (Some(next), 0),
            Some(next) => self.normalize((Some(next), 1)),
            None => (Some(slot), node.len()),
        }
    }

    /// One step towards the front, or `None` from the first element.
    pub(crate) fn step_back(&self, (slot, index): Loc) -> Option<Loc> {
        let slot = slot?;
        if index > 0 {
            return Some((Some(slot), index - 1));
        }
        let prev = self.arena[slot].prev?;
        Some((Some(prev), self.arena[prev].len() - 1))
    }

    pub(crate) fn element(&self, (slot, index): Loc) -> Option<&T> {
        self.arena.get(slot?)?.get(index)
    }

    pub(crate) fn element_mut(&mut self, (slot, index): Loc) -> Option<&mut T> {
        self.arena.get_mut(slot?)?.get_mut(index)
    }

    /// Inserts `value` before `loc` and returns where it ended up.
    pub(crate) fn insert_at(&mut self, loc: Loc, value: T) -> Result<(usize, usize), AllocError> {
        self.insert_with(loc, value, &mut Vec::new())
    }

    /// Like `insert_at`, taking any node it needs from `spare` first.
    fn insert_with(
        &mut self,
        loc: Loc,
        value: T,
        spare: &mut Vec<usize>,
    ) -> Result<(usize, usize), AllocError> {
        let (slot, index) = match loc {
            (Some(slot), index) if !self.arena[slot].is_full() => (slot, index),
            (Some(slot), index) => self.split_full_node(slot, index, spare)?,
            (None, _) => {
                let slot = self.acquire_node(spare)?;
                self.link_after(slot, None);
                (slot, 0)
            }
        };
        // SAFETY: the target node has room and `index <= len`, either as
        // given or as computed by the split.
        unsafe { self.arena[slot].insert_unchecked(index, value) };
        self.len += 1;
        Ok((slot, index))
    }

    /// Removes the element at `(slot, index)`, restores the fill floor, and
    /// returns the value together with the location of its successor.
    pub(crate) fn erase_at(&mut self, slot: usize, index: usize) -> Option<(T, Loc)> {
        let value = self.arena.get_mut(slot)?.remove(index)?;
        self.len -= 1;
        let next = if self.arena[slot].is_empty() {
            let next = self.arena[slot].next;
            self.unlink(slot);
            self.destroy_node(slot);
            match next {
                Some(next) => (Some(next), 0),
                None => self.end_loc(),
            }
        } else {
            let (slot, index) = self.rebalance(slot, index);
            self.normalize((Some(slot), index))
        };
        Some((value, next))
    }

    /// Counts the nodes that inserting `count` elements one after another
    /// at `loc` will create. Follows the split rule of `split_full_node`:
    /// every element lands right after the previous one, so only the node
    /// holding the insertion point matters.
    fn nodes_needed(&self, (slot, index): Loc, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let (mut len, mut index, mut needed) = match slot {
            Some(slot) => (self.arena[slot].len(), index, 0),
            None => (0, 0, 1),
        };
        for _ in 0..count {
            if len == K {
                needed += 1;
                let keep = K / 2;
                if index <= keep {
                    len = keep;
                } else {
                    len = K - keep - 1;
                    index -= keep + 1;
                }
            }
            len += 1;
            index += 1;
        }
        needed
    }
}

#[cold]
fn alloc_failed(err: AllocError) -> ! {
    panic!("{}", err)
}

impl<T, const K: usize> UnrolledList<T, K, Global> {
    /// Creates an empty `UnrolledList`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    /// let list: UnrolledList<u32> = UnrolledList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a list holding `n` clones of `value`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    /// let list: UnrolledList<&str, 4> = UnrolledList::from_elem(6, "x");
    /// assert_eq!(list.len(), 6);
    /// assert_eq!(list.node_count(), 2);
    /// ```
    pub fn from_elem(n: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, Global)
    }
}

impl<T, const K: usize, A: NodeAllocator> UnrolledList<T, K, A> {
    /// Creates an empty `UnrolledList` whose nodes are accounted by `alloc`.
    #[inline]
    pub fn new_in(alloc: A) -> Self {
        Self {
            arena: Arena::new(),
            first: None,
            last: None,
            len: 0,
            alloc,
        }
    }

    /// Like [`UnrolledList::from_elem`], with an explicit allocator.
    ///
    /// # Panics
    ///
    /// Panics if the allocator refuses a node.
    pub fn from_elem_in(n: usize, value: T, alloc: A) -> Self
    where
        T: Clone,
    {
        let mut list = Self::new_in(alloc);
        list.extend(std::iter::repeat(value).take(n));
        list
    }

    /// Builds a list from a fallible source. If the source fails or the
    /// allocator refuses, everything built so far is released and the error
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::{Global, TryExtendError, UnrolledList};
    ///
    /// let ok: Result<UnrolledList<i32, 4>, TryExtendError<&str>> =
    ///     UnrolledList::try_from_iter_in([Ok(1), Ok(2)], Global);
    /// assert_eq!(ok.unwrap().len(), 2);
    ///
    /// let err: Result<UnrolledList<i32, 4>, _> =
    ///     UnrolledList::try_from_iter_in([Ok(1), Err("bad input"), Ok(3)], Global);
    /// assert!(matches!(err, Err(TryExtendError::Source("bad input"))));
    /// ```
    pub fn try_from_iter_in<I, E>(iter: I, alloc: A) -> Result<Self, TryExtendError<E>>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        let mut list = Self::new_in(alloc);
        for item in iter {
            let value = item.map_err(TryExtendError::Source)?;
            list.try_push_back(value).map_err(ListError::from)?;
        }
        Ok(list)
    }

    /// Returns `true` if the `UnrolledList` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements in the `UnrolledList`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The largest number of elements the list could ever address.
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / mem::size_of::<T>().max(1)
    }

    /// Returns a reference to the node allocator.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Number of nodes in the chain.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    /// Lengths of the nodes, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 5> = (0..11).collect();
    /// assert_eq!(list.node_sizes(), [5, 5, 1]);
    /// ```
    pub fn node_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.arena.live());
        let mut current = self.first;
        while let Some(slot) = current {
            let node = &self.arena[slot];
            sizes.push(node.len());
            current = node.next;
        }
        sizes
    }

    /// Checks every structural invariant of the chain: mirrored links,
    /// boundary nodes, no empty or overfull nodes, element count and node
    /// ownership.
    pub fn validate_invariants(&self) -> Result<(), InvariantError> {
        if self.first.is_none() != self.last.is_none() {
            return Err(InvariantError::BoundaryMismatch);
        }
        let mut prev: Option<usize> = None;
        let mut current = self.first;
        let mut linked = 0;
        let mut count = 0;
        while let Some(slot) = current {
            linked += 1;
            if linked > self.arena.live() {
                return Err(InvariantError::Cycle);
            }
            let node = self.arena.get(slot).ok_or(InvariantError::BrokenLink {
                from: prev.unwrap_or(slot),
                to: slot,
            })?;
            match prev {
                None if node.prev.is_some() => return Err(InvariantError::BoundaryMismatch),
                Some(p) if node.prev != Some(p) => {
                    return Err(InvariantError::BrokenLink { from: p, to: slot })
                }
                _ => {}
            }
            if node.is_empty() {
                return Err(InvariantError::EmptyNode { slot });
            }
            if node.len() > K {
                return Err(InvariantError::Overfull {
                    slot,
                    len: node.len(),
                });
            }
            count += node.len();
            prev = Some(slot);
            current = node.next;
        }
        if prev != self.last {
            return Err(InvariantError::BoundaryMismatch);
        }
        if count != self.len {
            return Err(InvariantError::CountMismatch {
                recorded: self.len,
                actual: count,
            });
        }
        if linked != self.arena.live() {
            return Err(InvariantError::OrphanedNodes {
                live: self.arena.live(),
                linked,
            });
        }
        Ok(())
    }

    /// Removes all elements from the `UnrolledList`, destroying the nodes in
    /// chain order.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 4> = (0..10).collect();
    /// list.clear();
    /// assert!(list.is_empty());
    /// assert_eq!(list.node_count(), 0);
    /// assert_eq!(list.front(), None);
    /// ```
    pub fn clear(&mut self) {
        while let Some(slot) = self.first {
            let next = self.arena[slot].next;
            self.len -= self.arena[slot].len();
            self.first = next;
            match next {
                Some(next) => self.arena[next].prev = None,
                None => self.last = None,
            }
            self.destroy_node(slot);
        }
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.arena.get(self.first?)?.front()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.arena.get_mut(self.first?)?.front_mut()
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// if let Some(x) = list.back_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.back(), Some(&5));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.arena.get(self.last?)?.back()
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.arena.get_mut(self.last?)?.back_mut()
    }

    /// Returns the element at logical `index`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*/`K`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 3> = (0..10).collect();
    /// assert_eq!(list.get(7), Some(&7));
    /// assert_eq!(list.get(10), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        let (slot, index) = self.loc_of(index)?;
        self.arena[slot].get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (slot, index) = self.loc_of(index)?;
        self.arena[slot].get_mut(index)
    }

    /// Appends an element to the back of the list, creating a new last node
    /// when the current one is full.
    ///
    /// # Panics
    ///
    /// Panics if the allocator refuses a node. See
    /// [`UnrolledList::try_push_back`].
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back(), Some(&3));
    /// ```
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            alloc_failed(err)
        }
    }

    /// Appends an element to the back of the list. If a new node is needed
    /// and the allocator refuses it, `value` is dropped and the list is left
    /// untouched.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn try_push_back(&mut self, value: T) -> Result<(), AllocError> {
        let slot = match self.last {
            Some(last) if !self.arena[last].is_full() => last,
            last => {
                let slot = self.create_node()?;
                self.link_after(slot, last);
                slot
            }
        };
        // SAFETY: `slot` is either a non-full last node or a fresh one.
        unsafe { self.arena[slot].push_back_unchecked(value) };
        self.len += 1;
        Ok(())
    }

    /// Adds an element first in the list.
    ///
    /// # Panics
    ///
    /// Panics if the allocator refuses a node. See
    /// [`UnrolledList::try_push_front`].
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front(), Some(&2));
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            alloc_failed(err)
        }
    }

    /// Adds an element first in the list, or reports an allocator refusal
    /// with the list untouched.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn try_push_front(&mut self, value: T) -> Result<(), AllocError> {
        let slot = match self.first {
            Some(first) if !self.arena[first].is_full() => first,
            _ => {
                let slot = self.create_node()?;
                self.link_after(slot, None);
                slot
            }
        };
        // SAFETY: `slot` is either a non-full first node or a fresh one.
        unsafe { self.arena[slot].push_front_unchecked(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it, or `None` if the list is
    /// empty. A last node left empty is released.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.last?;
        let value = self.arena[last].pop_back()?;
        self.len -= 1;
        if self.arena[last].is_empty() {
            self.unlink(last);
            self.destroy_node(last);
        }
        Some(value)
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty. A first node left empty is released.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = UnrolledList::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        let first = self.first?;
        let value = self.arena[first].pop_front()?;
        self.len -= 1;
        if self.arena[first].is_empty() {
            self.unlink(first);
            self.destroy_node(first);
        }
        Some(value)
    }

    /// The position of the first element, or the end position if the list
    /// is empty.
    pub fn begin(&self) -> Position {
        self.to_position(self.begin_loc())
    }

    /// The past-the-end position, `(last, len(last))`. On an empty list this
    /// is the placeholder position, which is only good for insertion.
    pub fn end(&self) -> Position {
        self.to_position(self.end_loc())
    }

    /// The position of logical index `at`; `at == len` gives [`end`].
    ///
    /// [`end`]: UnrolledList::end
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*/`K`) time.
    pub fn position(&self, at: usize) -> Result<Position, ListError> {
        if at == self.len {
            return Ok(self.end());
        }
        let (slot, index) = self.loc_of(at).ok_or(ListError::OutOfBounds {
            index: at,
            len: self.len,
        })?;
        Ok(self.to_position((Some(slot), index)))
    }

    /// The logical index `pos` refers to.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*/`K`) time.
    pub fn index_of(&self, pos: Position) -> Result<usize, ListError> {
        let (slot, index) = self.locate(pos)?;
        let mut before = 0;
        let mut current = slot.and_then(|slot| self.arena[slot].prev);
        while let Some(prev) = current {
            before += self.arena[prev].len();
            current = self.arena[prev].prev;
        }
        Ok(before + index)
    }

    /// Steps `pos` one element towards the back. Crosses into the next node
    /// from the last index of a node; fails at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = (0..3).collect();
    /// let mut pos = list.begin();
    /// for expected in 0..3 {
    ///     assert_eq!(list.value_at(pos), Ok(&expected));
    ///     pos = list.next_position(pos).unwrap();
    /// }
    /// assert_eq!(pos, list.end());
    /// assert!(list.next_position(pos).is_err());
    /// ```
    pub fn next_position(&self, pos: Position) -> Result<Position, ListError> {
        let loc = self.normalize(self.locate(pos)?);
        if loc == self.end_loc() {
            return Err(ListError::OutOfBounds {
                index: self.len,
                len: self.len,
            });
        }
        Ok(self.to_position(self.step_forward(loc)))
    }

    /// Steps `pos` one element towards the front. Crosses into the previous
    /// node from index 0 of a node; fails at the first element.
    pub fn prev_position(&self, pos: Position) -> Result<Position, ListError> {
        let loc = self.normalize(self.locate(pos)?);
        self.step_back(loc)
            .map(|loc| self.to_position(loc))
            .ok_or(ListError::OutOfBounds {
                index: 0,
                len: self.len,
            })
    }

    /// The element `pos` refers to.
    pub fn value_at(&self, pos: Position) -> Result<&T, ListError> {
        let (slot, index) = self.locate_element(pos)?;
        self.arena[slot]
            .get(index)
            .ok_or(ListError::InvalidPosition)
    }

    pub fn value_at_mut(&mut self, pos: Position) -> Result<&mut T, ListError> {
        let (slot, index) = self.locate_element(pos)?;
        self.arena[slot]
            .get_mut(index)
            .ok_or(ListError::InvalidPosition)
    }

    /// Inserts `value` before `pos` and returns the position of the new
    /// element.
    ///
    /// A full target node is split first: the new node takes the tail of the
    /// old one and is linked right after it. If the allocator refuses that
    /// node, the list is left untouched. Positions into the split node are
    /// invalidated.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`K`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<char, 4> = "abde".chars().collect();
    /// let pos = list.position(2).unwrap();
    /// let pos = list.insert(pos, 'c').unwrap();
    /// assert_eq!(list.value_at(pos), Ok(&'c'));
    /// assert_eq!(list.iter().collect::<String>(), "abcde");
    /// assert_eq!(list.node_sizes(), [3, 2]);
    /// ```
    pub fn insert(&mut self, pos: Position, value: T) -> Result<Position, ListError> {
        let loc = self.locate(pos)?;
        let (slot, index) = self.insert_at(loc, value)?;
        Ok(self.to_position((Some(slot), index)))
    }

    /// Inserts `n` clones of `value` before `pos`; see
    /// [`UnrolledList::insert_iter`].
    pub fn insert_n(&mut self, pos: Position, n: usize, value: T) -> Result<Position, ListError>
    where
        T: Clone,
    {
        self.insert_iter(pos, std::iter::repeat(value).take(n))
    }

    /// Inserts the elements of `iter`, in order, before `pos`. Returns the
    /// position of the first inserted element, or `pos` itself when `iter`
    /// is empty.
    ///
    /// Elements go in one by one, so a long run may split several nodes.
    /// The source is drained and every node the run will split off is
    /// allocated before the list is touched: a panicking source or a refused
    /// allocation leaves the list exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 3> = [0, 1, 5].into();
    /// let pos = list.position(2).unwrap();
    /// let first = list.insert_iter(pos, 2..5).unwrap();
    /// assert_eq!(list.value_at(first), Ok(&2));
    /// assert!(list.iter().copied().eq(0..6));
    /// ```
    pub fn insert_iter<I>(&mut self, pos: Position, iter: I) -> Result<Position, ListError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut loc = self.locate(pos)?;
        let staged: Vec<T> = iter.into_iter().collect();
        let inserted = staged.len();
        if inserted == 0 {
            return Ok(pos);
        }
        let mut spare = self.reserve_nodes(self.nodes_needed(loc, inserted))?;
        trace!(count = inserted, nodes = spare.len(), "reserved nodes for insertion");
        for value in staged {
            // every split draws from the reservation
            let (slot, index) = self.insert_with(loc, value, &mut spare)?;
            loc = (Some(slot), index + 1);
        }
        debug_assert!(spare.is_empty());
        self.release_nodes(spare);
        for _ in 0..inserted {
            match self.step_back(loc) {
                Some(prev) => loc = prev,
                None => break,
            }
        }
        Ok(self.to_position(self.normalize(loc)))
    }

    /// Like [`UnrolledList::insert_iter`], for a fallible source. The source
    /// is drained before the list is touched, so a source error leaves the
    /// list as it was.
    pub fn try_insert_iter<I, E>(
        &mut self,
        pos: Position,
        iter: I,
    ) -> Result<Position, TryExtendError<E>>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        self.locate(pos)?;
        let staged = iter
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(TryExtendError::Source)?;
        Ok(self.insert_iter(pos, staged)?)
    }

    /// Appends every element of `iter`, or none of them: the source is
    /// drained first, and if the allocator refuses a node part way the
    /// appended elements are popped again.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), AllocError>
    where
        I: IntoIterator<Item = T>,
    {
        let staged: Vec<T> = iter.into_iter().collect();
        let mut pushed = 0;
        for value in staged {
            if let Err(err) = self.try_push_back(value) {
                debug!(count = pushed, "rolling back partial extension");
                for _ in 0..pushed {
                    self.pop_back();
                }
                return Err(err);
            }
            pushed += 1;
        }
        Ok(())
    }

    /// Removes the element at `pos` and returns the position of the element
    /// that now follows it, or [`end`] if it was the last one.
    ///
    /// A node left empty is released. A node left under `K - K/2` elements
    /// is merged into a neighbour when both fit in one node, or refilled
    /// from a neighbour that can spare elements; the previous neighbour is
    /// tried first. Positions into the touched nodes are invalidated.
    ///
    /// [`end`]: UnrolledList::end
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`K`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 4> = (0..8).collect();
    /// assert_eq!(list.node_sizes(), [4, 4]);
    ///
    /// let pos = list.position(1).unwrap();
    /// let pos = list.erase(pos).unwrap();
    /// let pos = list.erase(pos).unwrap();
    /// assert_eq!(list.value_at(pos), Ok(&3));
    /// assert_eq!(list.node_sizes(), [2, 4]);
    ///
    /// // under the floor: refilled from its neighbour
    /// list.erase(pos).unwrap();
    /// assert_eq!(list.node_sizes(), [2, 3]);
    /// assert!(list.iter().copied().eq([0, 4, 5, 6, 7]));
    ///
    /// // small enough to share one node: merged
    /// list.erase(list.begin()).unwrap();
    /// assert_eq!(list.node_sizes(), [4]);
    /// ```
    pub fn erase(&mut self, pos: Position) -> Result<Position, ListError> {
        self.take(pos).map(|(_, next)| next)
    }

    /// Like [`UnrolledList::erase`], handing back the removed element.
    pub fn take(&mut self, pos: Position) -> Result<(T, Position), ListError> {
        let (slot, index) = self.locate_element(pos)?;
        let (value, next) = self
            .erase_at(slot, index)
            .ok_or(ListError::InvalidPosition)?;
        Ok((value, self.to_position(next)))
    }

    /// Removes the elements in `first..last` and returns the position of the
    /// element that followed the range.
    ///
    /// Nodes wholly inside the range are unlinked and released in one step
    /// each; the elements left at the two boundary nodes are then removed
    /// one by one, rebalancing as [`UnrolledList::erase`] does.
    ///
    /// # Errors
    ///
    /// [`ListError::InvalidRange`] if `last` is not reachable from `first`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 5> = (0..20).collect();
    /// let first = list.position(3).unwrap();
    /// let last = list.position(13).unwrap();
    /// let next = list.erase_range(first, last).unwrap();
    /// assert_eq!(list.value_at(next), Ok(&13));
    /// assert!(list.iter().copied().eq((0..3).chain(13..20)));
    /// ```
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<Position, ListError> {
        let start = self.locate(first)?;
        let end = self.locate(last)?;
        let (Some(start_slot), start_index) = start else {
            return match end {
                (None, _) => Ok(first),
                _ => Err(ListError::InvalidRange),
            };
        };
        let Some(end_slot) = end.0 else {
            return Err(ListError::InvalidRange);
        };
        let end_index = end.1;

        // Measure every node in the range before touching anything.
        let mut whole = Vec::new();
        let mut partial = 0;
        let mut current = Some(start_slot);
        loop {
            let Some(slot) = current else {
                return Err(ListError::InvalidRange);
            };
            let node = &self.arena[slot];
            let lo = if slot == start_slot { start_index } else { 0 };
            let hi = if slot == end_slot {
                end_index
            } else {
                node.len()
            };
            if lo > hi {
                return Err(ListError::InvalidRange);
            }
            if lo == 0 && hi == node.len() {
                whole.push(slot);
            } else {
                partial += hi - lo;
            }
            if slot == end_slot {
                break;
            }
            current = node.next;
        }
        debug!(whole_nodes = whole.len(), partial, "erasing range");

        let start_removed = whole.first() == Some(&start_slot);
        let end_removed = whole.last() == Some(&end_slot);
        let after_end = self.arena[end_slot].next;
        for &slot in &whole {
            self.len -= self.arena[slot].len();
            self.unlink(slot);
            self.destroy_node(slot);
        }

        let mut loc = if !start_removed {
            self.normalize((Some(start_slot), start_index))
        } else if !end_removed {
            (Some(end_slot), 0)
        } else {
            match after_end {
                Some(next) => (Some(next), 0),
                None => self.end_loc(),
            }
        };
        for _ in 0..partial {
            let (Some(slot), index) = loc else {
                break;
            };
            match self.erase_at(slot, index) {
                Some((_, next)) => loc = next,
                None => break,
            }
        }
        Ok(self.to_position(loc))
    }

    /// Exchanges the contents of two lists, allocators included, in *O*(1)
    /// time. Positions follow the elements they name.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Replaces the contents of the list with the elements of `iter`.
    ///
    /// The replacement chain is built completely before the old one is
    /// released, so the list is untouched if building panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 4> = (0..10).collect();
    /// let old_end = list.end();
    /// list.assign(5..7);
    /// assert!(list.iter().copied().eq(5..7));
    /// assert!(list.value_at(old_end).is_err());
    /// ```
    pub fn assign<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
        A: Clone,
    {
        let mut fresh = Self::new_in(self.alloc.clone());
        fresh.extend(iter);
        self.swap(&mut fresh);
    }

    /// Like [`UnrolledList::assign`], for a fallible source. On error the
    /// list keeps its old contents and the partial replacement is released.
    pub fn try_assign<I, E>(&mut self, iter: I) -> Result<(), TryExtendError<E>>
    where
        I: IntoIterator<Item = Result<T, E>>,
        A: Clone,
    {
        let mut fresh = Self::try_from_iter_in(iter, self.alloc.clone())?;
        self.swap(&mut fresh);
        Ok(())
    }

    /// Provides a cursor at the element with logical index `at`.
    ///
    /// By convention, the cursor is at the end if `at == len`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = [1, 2, 3].into();
    /// assert_eq!(list.cursor(1).current(), Some(&2));
    /// assert_eq!(list.cursor(3).current(), None);
    /// ```
    pub fn cursor(&self, at: usize) -> Cursor<'_, T, K, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        let loc = match self.loc_of(at) {
            Some((slot, index)) => (Some(slot), index),
            None => self.end_loc(),
        };
        Cursor::new(self, loc, at)
    }

    /// Provides a cursor at the first element, or at the end if the list is
    /// empty.
    pub fn cursor_start(&self) -> Cursor<'_, T, K, A> {
        Cursor::new(self, self.begin_loc(), 0)
    }

    /// Provides a cursor at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32> = [1, 2, 3].into();
    /// let cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, K, A> {
        Cursor::new(self, self.end_loc(), self.len)
    }

    /// Provides a cursor with editing operations at the element with
    /// logical index `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32> = [1, 2, 3].into();
    /// let mut cursor = list.cursor_mut(1);
    ///
    /// if let Some(x) = cursor.current_mut() {
    ///     *x *= 5;
    /// }
    /// assert_eq!(cursor.current(), Some(&10));
    /// assert_eq!(list.cursor_mut(3).current_mut(), None);
    /// ```
    pub fn cursor_mut(&mut self, at: usize) -> CursorMut<'_, T, K, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        let loc = match self.loc_of(at) {
            Some((slot, index)) => (Some(slot), index),
            None => self.end_loc(),
        };
        CursorMut::new(self, loc, at)
    }

    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T, K, A> {
        let loc = self.begin_loc();
        CursorMut::new(self, loc, 0)
    }

    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, K, A> {
        let (loc, len) = (self.end_loc(), self.len);
        CursorMut::new(self, loc, len)
    }

    /// Provides a forward iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 2> = (0..3).collect();
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next_back(), Some(&2));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, K> {
        Iter::new(self)
    }

    /// Provides a forward iterator with mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = (0..5).collect();
    /// for x in list.iter_mut() {
    ///     *x *= 10;
    /// }
    /// assert!(list.iter().copied().eq([0, 10, 20, 30, 40]));
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, K> {
        IterMut::new(self)
    }
}

impl<T, const K: usize, A: NodeAllocator> Drop for UnrolledList<T, K, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, const K: usize, A: NodeAllocator + Default> Default for UnrolledList<T, K, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Debug, const K: usize, A: NodeAllocator> Debug for UnrolledList<T, K, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

// Ensure that `UnrolledList` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: UnrolledList<&'static str>) -> UnrolledList<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ListError;
    use crate::list::UnrolledList;
    use std::cell::RefCell;
    use std::fmt::Debug;

    fn list_eq<T, I, const K: usize>(list: &UnrolledList<T, K>, expected: I)
    where
        T: Debug + Clone + Eq,
        I: IntoIterator<Item = T>,
    {
        assert_eq!(
            list.iter().cloned().collect::<Vec<_>>(),
            expected.into_iter().collect::<Vec<_>>()
        );
        list.validate_invariants().unwrap();
    }

    #[test]
    fn list_create() {
        let mut list: UnrolledList<i32> = UnrolledList::new();
        assert!(list.is_empty());
        assert_eq!(list.begin(), list.end());
        list.push_back(1);
        assert!(!list.is_empty());
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
        assert_eq!(list.node_count(), 0);
        list.validate_invariants().unwrap();
    }

    #[test]
    fn list_drop() {
        #[derive(Debug)]
        struct DropChecker<'a, T: Copy> {
            value: T,
            dropped: &'a RefCell<Vec<T>>,
        }
        impl<'a, T: Copy> DropChecker<'a, T> {
            fn new(value: T, dropped: &'a RefCell<Vec<T>>) -> Self {
                Self { value, dropped }
            }
        }
        impl<'a, T: Copy> Drop for DropChecker<'a, T> {
            fn drop(&mut self) {
                self.dropped.borrow_mut().push(self.value);
            }
        }
        let dropped = RefCell::new(Vec::<i32>::new());
        let mut list: UnrolledList<_, 2> = UnrolledList::new();
        for i in 1..=5 {
            list.push_back(DropChecker::new(i, &dropped));
        }
        let pos = list.position(2).unwrap();
        list.erase(pos).unwrap();
        assert_eq!(dropped.borrow().as_slice(), &[3]);
        drop(list);
        assert_eq!(dropped.borrow().as_slice(), &[3, 1, 2, 4, 5]);
    }

    #[test]
    fn list_push_and_pop() {
        let mut list: UnrolledList<i32, 3> = UnrolledList::new();
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);

        list.push_front(1);
        list.push_front(2);
        list.push_back(3);
        list.push_back(4);
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.back(), Some(&4));
        assert_eq!(list.node_sizes(), [3, 1]);
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_back(), Some(4));
        assert_eq!(list.node_sizes(), [2]);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(3));
        assert_eq!(list.front(), None);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        list.validate_invariants().unwrap();
    }

    #[test]
    fn list_insert_and_erase() {
        let mut list: UnrolledList<i32, 4> = (0..10).collect();
        let pos = list.position(5).unwrap();
        list.insert(pos, 10).unwrap();
        list_eq(&list, (0..5).chain(Some(10)).chain(5..10));

        let pos = list.position(10).unwrap();
        let (value, next) = list.take(pos).unwrap();
        assert_eq!(value, 9);
        assert_eq!(next, list.end());
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        let first = list.insert(list.begin(), 11).unwrap();
        assert_eq!(first, list.begin());
        list_eq(&list, (11..=11).chain(0..5).chain(Some(10)).chain(5..9));

        let next = list.erase(list.begin()).unwrap();
        assert_eq!(list.value_at(next), Ok(&0));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        let pos = list.insert(list.end(), 12).unwrap();
        assert_eq!(list.back(), Some(&12));
        assert_eq!(list.next_position(pos), Ok(list.end()));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9).chain(Some(12)));
    }

    #[test]
    fn list_insert_into_empty() {
        let mut list: UnrolledList<&str, 3> = UnrolledList::new();
        let pos = list.insert(list.end(), "a").unwrap();
        assert_eq!(pos, list.begin());
        assert_eq!(list.erase(pos), Ok(list.end()));
        assert!(list.is_empty());
        assert_eq!(list.node_count(), 0);
    }

    #[test]
    fn list_positions_go_stale() {
        let mut list: UnrolledList<i32, 2> = (0..4).collect();
        let last = list.position(3).unwrap();
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.value_at(last), Err(ListError::InvalidPosition));
        assert_eq!(list.erase(last), Err(ListError::InvalidPosition));

        let other: UnrolledList<i32, 2> = (0..4).collect();
        assert_eq!(list.value_at(other.begin()), Err(ListError::InvalidPosition));

        list.clear();
        assert_eq!(list.insert(last, 0), Err(ListError::InvalidPosition));
        assert!(list.insert(list.end(), 0).is_ok());
    }

    #[test]
    fn list_end_is_not_an_element() {
        let mut list: UnrolledList<i32, 4> = (0..3).collect();
        assert_eq!(
            list.erase(list.end()),
            Err(ListError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            list.position(4),
            Err(ListError::OutOfBounds { index: 4, len: 3 })
        );
        assert!(list.prev_position(list.begin()).is_err());
        assert_eq!(list.index_of(list.end()), Ok(3));
    }

    #[test]
    fn list_get_walks_from_both_ends() {
        let mut list: UnrolledList<usize, 3> = (0..50).collect();
        for i in 0..50 {
            assert_eq!(list.get(i), Some(&i));
            let pos = list.position(i).unwrap();
            assert_eq!(list.index_of(pos), Ok(i));
        }
        *list.get_mut(49).unwrap() = 0;
        assert_eq!(list.back(), Some(&0));
        assert_eq!(list.get(50), None);
    }

    #[test]
    fn list_swap_and_assign() {
        let mut a: UnrolledList<i32, 3> = (0..5).collect();
        let mut b: UnrolledList<i32, 3> = (10..12).collect();
        let pos = a.begin();
        a.swap(&mut b);
        list_eq(&a, 10..12);
        list_eq(&b, 0..5);
        assert_eq!(b.value_at(pos), Ok(&0));

        a.assign(vec![7; 4]);
        list_eq(&a, vec![7; 4]);

        let err = a.try_assign([Ok(1), Err("nope")]);
        assert!(err.is_err());
        list_eq(&a, vec![7; 4]);
        a.try_assign::<_, ()>([Ok(1), Ok(2)]).unwrap();
        list_eq(&a, [1, 2]);
    }

    #[test]
    fn list_insert_n_keeps_list_when_clone_panics() {
        use std::cell::Cell;
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::rc::Rc;

        #[derive(Debug)]
        struct Fragile {
            value: i32,
            clones_left: Rc<Cell<usize>>,
        }
        impl Clone for Fragile {
            fn clone(&self) -> Self {
                let left = self.clones_left.get();
                if left == 0 {
                    panic!("out of clones");
                }
                self.clones_left.set(left - 1);
                Self {
                    value: self.value,
                    clones_left: Rc::clone(&self.clones_left),
                }
            }
        }

        let clones_left = Rc::new(Cell::new(0));
        let fragile = |value| Fragile {
            value,
            clones_left: Rc::clone(&clones_left),
        };
        let mut list: UnrolledList<Fragile, 3> = (0..6).map(fragile).collect();
        assert_eq!(list.node_sizes(), [3, 3]);
        let pos = list.position(2).unwrap();

        clones_left.set(4);
        let result = catch_unwind(AssertUnwindSafe(|| list.insert_n(pos, 10, fragile(99))));
        assert!(result.is_err());
        assert_eq!(list.len(), 6);
        assert_eq!(list.node_sizes(), [3, 3]);
        assert!(list.iter().map(|f| f.value).eq(0..6));
        assert_eq!(list.value_at(pos).map(|f| f.value), Ok(2));
        list.validate_invariants().unwrap();

        clones_left.set(usize::MAX);
        let first = list.insert_n(pos, 2, fragile(99)).unwrap();
        assert_eq!(list.index_of(first), Ok(2));
        assert!(list.iter().map(|f| f.value).eq([0, 1, 99, 99, 2, 3, 4, 5]));
        assert_eq!(list.node_sizes(), [2, 3, 3]);
    }

    #[test]
    fn list_insert_iter_reserves_exactly_the_split_nodes() {
        fn check<const K: usize>() {
            for len in [0, 1, K, 2 * K + 1, 4 * K] {
                for at in 0..=len {
                    for count in [1, 2, K, 3 * K + 1] {
                        let mut list: UnrolledList<usize, K> = (0..len).collect();
                        let pos = list.position(at).unwrap();
                        let needed = list.nodes_needed(list.locate(pos).unwrap(), count);
                        let before = list.node_count();
                        list.insert_iter(pos, 0..count).unwrap();
                        assert_eq!(
                            list.node_count(),
                            before + needed,
                            "K = {}, len = {}, at = {}, count = {}",
                            K,
                            len,
                            at,
                            count
                        );
                        list.validate_invariants().unwrap();
                    }
                }
            }
        }
        check::<1>();
        check::<2>();
        check::<3>();
        check::<4>();
        check::<5>();
    }
}
