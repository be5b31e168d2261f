//! The fixed-capacity circular buffer every [`UnrolledList`] is made of.
//!
//! A `Node` owns a block of `K` slots of uninitialized storage. Its live
//! elements occupy `len` consecutive slots starting at the physical slot
//! `left`, wrapping around the end of the block, so both ends can grow and
//! shrink in *O*(1) time and a mid-buffer insertion or removal shifts at most
//! half of the elements.
//!
//! ```text
//!  physical:  [ 4 | 5 | _ | _ | _ | 1 | 2 | 3 ]      K = 8
//!                           left ---^
//!  logical:   [ 1 | 2 | 3 | 4 | 5 ]                  len = 5
//! ```
//!
//! [`UnrolledList`]: crate::UnrolledList

use std::fmt;
use std::mem::MaybeUninit;
use std::ops::{Index, IndexMut};
use std::ptr;
use std::slice;

/// A double-ended circular buffer of at most `K` elements.
///
/// Besides its elements a node carries the slot handles of its neighbours in
/// the chain. Those links are non-owning; the list decides when a node lives
/// and dies.
///
/// # Examples
///
/// ```
/// use unrolled_list::list::node::Node;
///
/// let mut node: Node<char, 4> = Node::new();
/// assert!(node.push_back('b').is_ok());
/// assert!(node.push_front('a').is_ok());
/// assert!(node.insert(2, 'd').is_ok());
/// assert!(node.insert(2, 'c').is_ok());
/// assert!(node.is_full());
///
/// // a full node hands the value back
/// assert_eq!(node.push_back('e'), Err('e'));
///
/// assert_eq!(node.iter().collect::<String>(), "abcd");
/// assert_eq!(node.remove(1), Some('b'));
/// assert_eq!(node[1], 'c');
/// ```
pub struct Node<T, const K: usize> {
    slots: [MaybeUninit<T>; K],
    left: usize,
    len: usize,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<T, const K: usize> Node<T, K> {
    const CAPACITY_IS_NONZERO: () = assert!(K > 0, "node capacity must be at least one");

    /// Creates an empty node.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_NONZERO;
        Self {
            // SAFETY: an array of `MaybeUninit` needs no initialization.
            slots: unsafe { MaybeUninit::<[MaybeUninit<T>; K]>::uninit().assume_init() },
            left: K / 2,
            len: 0,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == K
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        K
    }

    /// Number of elements that can still be added.
    #[inline]
    pub fn free(&self) -> usize {
        K - self.len
    }

    /// Translates a logical index into a physical slot.
    #[inline]
    fn physical(&self, index: usize) -> usize {
        wrap_add::<K>(self.left, index)
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back(&self) -> Option<&T> {
        self.get(self.len.wrapping_sub(1))
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.wrapping_sub(1))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: logical indices below `len` map to initialized slots.
        Some(unsafe { self.slots[self.physical(index)].assume_init_ref() })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        // SAFETY: logical indices below `len` map to initialized slots.
        Some(unsafe { self.slots[slot].assume_init_mut() })
    }

    /// Appends `value`, or hands it back if the node is full.
    pub fn push_back(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        // SAFETY: checked above.
        unsafe { self.push_back_unchecked(value) };
        Ok(())
    }

    /// Prepends `value`, or hands it back if the node is full.
    pub fn push_front(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        // SAFETY: checked above.
        unsafe { self.push_front_unchecked(value) };
        Ok(())
    }

    /// # Safety
    ///
    /// The node must not be full.
    pub(crate) unsafe fn push_back_unchecked(&mut self, value: T) {
        debug_assert!(!self.is_full());
        if self.is_empty() {
            self.left = K / 2;
        }
        let slot = self.physical(self.len);
        self.slots[slot].write(value);
        self.len += 1;
    }

    /// # Safety
    ///
    /// The node must not be full.
    pub(crate) unsafe fn push_front_unchecked(&mut self, value: T) {
        debug_assert!(!self.is_full());
        if self.is_empty() {
            self.left = K / 2;
        }
        self.left = wrap_sub::<K>(self.left, 1);
        self.slots[self.left].write(value);
        self.len += 1;
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        let slot = self.physical(self.len);
        // SAFETY: the slot was the last live one and is no longer counted.
        Some(unsafe { self.slots[slot].assume_init_read() })
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let slot = self.left;
        self.left = wrap_add::<K>(self.left, 1);
        self.len -= 1;
        // SAFETY: the slot was the first live one and is no longer counted.
        Some(unsafe { self.slots[slot].assume_init_read() })
    }

    /// Inserts `value` so that it ends up at logical index `index`.
    ///
    /// The value is handed back if the node is full or `index > len`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(`index`, `len - index`)) time.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), T> {
        if self.is_full() || index > self.len {
            return Err(value);
        }
        // SAFETY: checked above.
        unsafe { self.insert_unchecked(index, value) };
        Ok(())
    }

    /// # Safety
    ///
    /// The node must not be full and `index <= len`.
    pub(crate) unsafe fn insert_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(!self.is_full() && index <= self.len);
        if index < (self.len + 1) / 2 {
            self.push_front_unchecked(value);
            for i in 0..index {
                self.swap_logical(i, i + 1);
            }
        } else {
            self.push_back_unchecked(value);
            for i in (index..self.len - 1).rev() {
                self.swap_logical(i, i + 1);
            }
        }
    }

    /// Removes and returns the element at logical index `index`, closing the
    /// gap from whichever end is nearer. Returns `None` if there is no such
    /// element.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(`index`, `len - index`)) time.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        if index < self.len / 2 {
            for i in (0..index).rev() {
                self.swap_logical(i, i + 1);
            }
            self.pop_front()
        } else {
            for i in index..self.len - 1 {
                self.swap_logical(i, i + 1);
            }
            self.pop_back()
        }
    }

    #[inline]
    fn swap_logical(&mut self, a: usize, b: usize) {
        let (a, b) = (self.physical(a), self.physical(b));
        self.slots.swap(a, b);
    }

    /// Returns the live elements as two slices, in logical order.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let (front, back) = self.ranges();
        // SAFETY: both ranges cover exactly the initialized slots.
        unsafe {
            (
                slice::from_raw_parts(self.slots.as_ptr().add(front.0).cast(), front.1),
                slice::from_raw_parts(self.slots.as_ptr().cast(), back),
            )
        }
    }

    /// Returns the live elements as two mutable slices, in logical order.
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let (front, back) = self.ranges();
        let base = self.slots.as_mut_ptr();
        // SAFETY: both ranges cover exactly the initialized slots, and they
        // do not overlap.
        unsafe {
            (
                slice::from_raw_parts_mut(base.add(front.0).cast(), front.1),
                slice::from_raw_parts_mut(base.cast(), back),
            )
        }
    }

    /// `((start, len), wrapped_len)` of the two physical runs.
    fn ranges(&self) -> ((usize, usize), usize) {
        if self.left + self.len <= K {
            ((self.left, self.len), 0)
        } else {
            let head = K - self.left;
            ((self.left, head), self.len - head)
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (front, back) = self.as_slices();
        front.iter().chain(back)
    }

    /// Reads the element count without creating a reference to the node.
    ///
    /// # Safety
    ///
    /// `node` must point to a live node.
    #[inline]
    pub(crate) unsafe fn raw_len(node: *const Self) -> usize {
        ptr::addr_of!((*node).len).read()
    }

    /// # Safety
    ///
    /// `node` must point to a live node.
    #[inline]
    pub(crate) unsafe fn raw_next(node: *const Self) -> Option<usize> {
        ptr::addr_of!((*node).next).read()
    }

    /// # Safety
    ///
    /// `node` must point to a live node.
    #[inline]
    pub(crate) unsafe fn raw_prev(node: *const Self) -> Option<usize> {
        ptr::addr_of!((*node).prev).read()
    }

    /// Pointer to the element at logical `index`, computed without creating a
    /// reference to the node or to any other element.
    ///
    /// # Safety
    ///
    /// `node` must point to a live node and `index` must be below its length.
    #[inline]
    pub(crate) unsafe fn raw_element(node: *mut Self, index: usize) -> *mut T {
        let left = ptr::addr_of!((*node).left).read();
        let slot = wrap_add::<K>(left, index);
        ptr::addr_of_mut!((*node).slots)
            .cast::<MaybeUninit<T>>()
            .add(slot)
            .cast::<T>()
    }
}

#[inline]
fn wrap_add<const K: usize>(a: usize, b: usize) -> usize {
    let sum = a + b;
    if sum >= K {
        sum - K
    } else {
        sum
    }
}

#[inline]
fn wrap_sub<const K: usize>(a: usize, b: usize) -> usize {
    if a >= b {
        a - b
    } else {
        a + K - b
    }
}

impl<T, const K: usize> Drop for Node<T, K> {
    fn drop(&mut self) {
        /// Runs the destructors of the second run even if one in the first
        /// run panics.
        struct Dropper<'a, T>(&'a mut [T]);

        impl<'a, T> Drop for Dropper<'a, T> {
            fn drop(&mut self) {
                // SAFETY: the slice covers initialized elements that are
                // never touched again.
                unsafe { ptr::drop_in_place(self.0) }
            }
        }

        let (front, back) = self.as_mut_slices();
        // SAFETY: see above.
        unsafe {
            let _back_dropper = Dropper(back);
            ptr::drop_in_place(front);
        }
    }
}

impl<T, const K: usize> Default for Node<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const K: usize> Index<usize> for Node<T, K> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {} out of range for node of {} elements", index, self.len),
        }
    }
}

impl<T, const K: usize> IndexMut<usize> for Node<T, K> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {} out of range for node of {} elements", index, len),
        }
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for Node<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Returns `true` if the elements of `a` and `b` fit in a single node.
#[inline]
pub fn can_be_merged<T, const K: usize>(a: &Node<T, K>, b: &Node<T, K>) -> bool {
    a.len + b.len <= K
}

/// Moves up to `max` elements from the front of `right` to the back of
/// `left`, bounded by what `right` holds and what `left` can take. Returns
/// the number of elements moved.
///
/// # Examples
///
/// ```
/// use unrolled_list::list::node::{move_to_left, Node};
///
/// let mut left: Node<i32, 4> = Node::new();
/// let mut right: Node<i32, 4> = Node::new();
/// left.push_back(1).unwrap();
/// for i in 2..6 {
///     right.push_back(i).unwrap();
/// }
///
/// assert_eq!(move_to_left(&mut left, &mut right, 10), 3);
/// assert_eq!(left.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4]);
/// assert_eq!(right.iter().copied().collect::<Vec<_>>(), [5]);
/// ```
pub fn move_to_left<T, const K: usize>(
    left: &mut Node<T, K>,
    right: &mut Node<T, K>,
    max: usize,
) -> usize {
    let count = max.min(right.len).min(left.free());
    for _ in 0..count {
        let Some(value) = right.pop_front() else {
            break;
        };
        // SAFETY: `count` never exceeds the free space of `left`.
        unsafe { left.push_back_unchecked(value) };
    }
    count
}

/// Moves up to `max` elements from the back of `left` to the front of
/// `right`, bounded by what `left` holds and what `right` can take. Returns
/// the number of elements moved.
pub fn move_to_right<T, const K: usize>(
    left: &mut Node<T, K>,
    right: &mut Node<T, K>,
    max: usize,
) -> usize {
    let count = max.min(left.len).min(right.free());
    for _ in 0..count {
        let Some(value) = left.pop_back() else {
            break;
        };
        // SAFETY: `count` never exceeds the free space of `right`.
        unsafe { right.push_front_unchecked(value) };
    }
    count
}
