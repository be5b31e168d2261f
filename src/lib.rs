//! This crate provides an unrolled linked list: a doubly-linked chain of
//! nodes, each of which stores up to `K` elements in a circular buffer.
//!
//! The [`UnrolledList`] allows inserting and removing elements at a known
//! [`Position`] while touching a single node (plus at most one neighbour),
//! and keeps elements packed in arrays so that iteration stays cheap. In
//! compromise, reaching the element with a given logical index walks the
//! chain node by node, in *O*(*n*/`K`) time.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list: UnrolledList<i32, 4> = [1, 2, 3, 4].into();
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(0); // insert 0 at the beginning of the list
//! assert_eq!(cursor.current(), Some(&1));
//! assert_eq!(cursor.view(), &UnrolledList::<i32, 4>::from([0, 1, 2, 3, 4]));
//!
//! cursor.seek_to(3).unwrap(); // move the cursor to index 3, and remove it
//! assert_eq!(cursor.remove(), Some(3));
//! assert_eq!(cursor.view(), &UnrolledList::<i32, 4>::from([0, 1, 2, 4]));
//!
//! list.push_front(5);
//! assert_eq!(list, UnrolledList::<i32, 4>::from([5, 0, 1, 2, 4]));
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the list is like the following graph (`K = 4`):
//! ```text
//!    ╔═══════════╗           ╔═══════════╗           ╔═══════════╗
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ║   next    ║ ──→ ∅
//!    ╟───────────╢           ╟───────────╢           ╟───────────╢
//! ∅ ←║   prev    ║ ←──────── ║   prev    ║ ←──────── ║   prev    ║
//!    ╟───────────╢           ╟───────────╢           ╟───────────╢
//!    ║ left, len ║           ║ left, len ║           ║ left, len ║
//!    ╟───────────╢           ╟───────────╢           ╟───────────╢
//!    ║  c ┄ a b  ║           ║  d e ┄ ┄  ║           ║  ┄ f g h  ║
//!    ╚═══════════╝           ╚═══════════╝           ╚═══════════╝
//!       Node 0                  Node 1                  Node 2
//!         ↑                                               ↑
//!    ╔═══════════╗                                        │
//!    ║   first   ║                                        │
//!    ╟───────────╢                                        │
//!    ║   last    ║ ───────────────────────────────────────┘
//!    ╟───────────╢
//!    ║   (len)   ║
//!    ╚═══════════╝
//!    UnrolledList
//! ```
//! The `UnrolledList` contains:
//! - `first` and `last`, the boundary nodes (both absent iff the list is
//!   empty);
//! - a length field `len`, always the sum of the node lengths;
//! - the [`NodeAllocator`] consulted before each node is created.
//!
//! Each node is allocated on heap, and contains:
//! - the `next` and `prev` links to its neighbours;
//! - a block of `K` element slots used as a circular buffer: the logical
//!   element `i` lives in slot `(left + i) % K`, and exactly `len` slots are
//!   initialized.
//!
//! Nodes are never left empty. A full node is split in two when an element
//! is inserted into it, and after an element is removed its node is merged
//! with or refilled from a neighbour so that it keeps at least `K - K/2`
//! elements, unless it is the only node.
//!
//! # Iteration
//!
//! Iterating over a list is by the [`Iter`] and [`IterMut`] iterators. These
//! are double-ended, exact-size and fused iterators. [`IterMut`] provides
//! mutability of the elements (but not of the node chain).
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list: UnrolledList<i32, 2> = [1, 2, 3].into();
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next_back(), Some(&3));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), None);
//! assert_eq!(iter.next(), None); // Fused
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(Vec::from_iter(list), vec![2, 4, 6]);
//! ```
//!
//! # Positions
//!
//! A [`Position`] names an element by its node and its index inside that
//! node. In a list with length *n* there are *n* + 1 positions: one per
//! element and the past-the-end position [`end`]. Positions are plain
//! copyable values. A position into a node that has since been released no
//! longer resolves, and using it fails with [`ListError::InvalidPosition`];
//! a position into a node whose elements were moved may name another
//! element. Every mutating method returns the position that stays
//! meaningful.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::{ListError, UnrolledList};
//!
//! let mut list: UnrolledList<char, 3> = "abcdef".chars().collect();
//! let pos = list.position(2).unwrap();
//! let pos = list.insert(pos, 'x').unwrap(); // splits the full first node
//! assert_eq!(list.value_at(pos), Ok(&'x'));
//! assert_eq!(list.index_of(pos), Ok(2));
//!
//! let after = list.erase(pos).unwrap();
//! assert_eq!(list.value_at(after), Ok(&'c'));
//! assert_eq!(list.iter().collect::<String>(), "abcdef");
//!
//! let end = list.end();
//! assert!(matches!(list.value_at(end), Err(ListError::IndexOutOfRange { .. })));
//! ```
//!
//! # Cursor Views
//!
//! Beside iteration and positions, the cursors [`Cursor`] and [`CursorMut`]
//! provide a way of walking the list that also tracks the logical index.
//! A cursor sits on one of the *n* + 1 locations and can move forward or
//! backward, failing at either end instead of wrapping around.
//!
//! [`CursorMut`] can also edit the list around it:
//! - [`insert`]: insert a new item before the cursor;
//! - [`remove`]: remove the item at the cursor;
//! - [`backspace`]: remove the item before the cursor.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list: UnrolledList<i32, 2> = [1, 2, 3, 4].into();
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(5); // becomes [5, 1, 2, 3, 4], points to 1
//! assert_eq!(cursor.current(), Some(&1));
//!
//! assert!(cursor.seek_forward(2).is_ok());
//! assert_eq!(cursor.remove(), Some(3)); // becomes [5, 1, 2, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(cursor.backspace(), Some(2)); // becomes [5, 1, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(Vec::from_iter(list), vec![5, 1, 4]);
//! ```
//!
//! # Allocators
//!
//! The list asks a [`NodeAllocator`] before creating each node. The default
//! [`Global`] never refuses; [`CountingAllocator`] records node churn and
//! [`BoundedAllocator`] refuses past a node budget. Every operation that may
//! need a node has a fallible form (`try_push_back`, `insert`,
//! `try_extend`, ...) that leaves the list untouched when the allocator
//! refuses.
//!
//! [`end`]: UnrolledList::end
//! [`insert`]: crate::list::cursor::CursorMut::insert
//! [`remove`]: crate::list::cursor::CursorMut::remove
//! [`backspace`]: crate::list::cursor::CursorMut::backspace

#[doc(inline)]
pub use alloc::{AllocStats, BoundedAllocator, CountingAllocator, Global, NodeAllocator};
#[doc(inline)]
pub use error::{AllocError, InvariantError, ListError, TryExtendError};
#[doc(inline)]
pub use list::cursor::{Cursor, CursorMut, Position};
#[doc(inline)]
pub use list::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::{UnrolledList, DEFAULT_NODE_CAPACITY};

pub mod alloc;
pub mod error;
pub mod list;
