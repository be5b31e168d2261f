use std::fmt;
use std::fmt::Formatter;

use crate::alloc::NodeAllocator;
use crate::error::{AllocError, ListError};
use crate::list::arena::NodeRef;
use crate::list::{Loc, UnrolledList, DEFAULT_NODE_CAPACITY};
use crate::Global;

/// A logical position in an [`UnrolledList`]: a node plus an index inside
/// it.
///
/// A `Position` is a plain value. It does not borrow the list, so the list
/// can be mutated while positions are held, and every method taking a
/// position checks it first. A position stops being valid once its node is
/// released, merged away or split; using it afterwards is reported as
/// [`ListError::InvalidPosition`] (or [`ListError::IndexOutOfRange`] when the
/// node survived but shrank), never as undefined behaviour.
///
/// The past-the-end position of a list is `(last, len(last))`. On an empty
/// list it is a placeholder naming no node, which is good for insertion
/// only.
///
/// # Examples
///
/// ```
/// use unrolled_list::{ListError, UnrolledList};
///
/// let mut list: UnrolledList<i32, 2> = (0..4).collect();
/// let third = list.position(2).unwrap();
/// assert_eq!(third.index_in_node(), 0);
/// assert_eq!(list.value_at(third), Ok(&2));
///
/// list.pop_back();
/// list.pop_back(); // releases the node `third` was in
/// assert_eq!(list.value_at(third), Err(ListError::InvalidPosition));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) node: Option<NodeRef>,
    pub(crate) index: usize,
}

impl Position {
    /// The logical index inside the node.
    pub fn index_in_node(&self) -> usize {
        self.index
    }

    /// Returns `true` for the position of an empty list, which names no
    /// node.
    pub fn is_placeholder(&self) -> bool {
        self.node.is_none()
    }
}

/// A cursor over an `UnrolledList`.
///
/// A `Cursor` is like an iterator, except that it can freely seek
/// back-and-forth.
///
/// In a list with length *n*, there are *n* + 1 valid locations for the
/// cursor, indexed by 0, 1, ..., *n*, where *n* is the end of the list.
///
/// # Examples
///
/// ```
/// use unrolled_list::UnrolledList;
///
/// // Create a list: [A B] [C D] (two nodes)
/// let list: UnrolledList<char, 2> = "ABCD".chars().collect();
///
/// // Create a cursor at start: [|A B] [C D] (index = 0)
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'A'));
///
/// // Move across the node boundary: [A B] [|C D] (index = 2)
/// assert!(cursor.seek_forward(2).is_ok());
/// assert_eq!(cursor.current(), Some(&'C'));
/// assert_eq!(cursor.previous(), Some(&'B'));
///
/// // Move to the end: [A B] [C D|] (index = 4)
/// cursor.move_to_end();
/// assert_eq!(cursor.current(), None);
/// assert!(cursor.move_next().is_err());
///
/// // Move backward: [A B] [C|D] (index = 3)
/// assert!(cursor.move_prev().is_ok());
/// assert_eq!(cursor.current(), Some(&'D'));
/// ```
pub struct Cursor<'a, T: 'a, const K: usize = DEFAULT_NODE_CAPACITY, A: NodeAllocator = Global> {
    index: usize,
    loc: Loc,
    list: &'a UnrolledList<T, K, A>,
}

/// A cursor over an `UnrolledList` with editing operations.
///
/// Insertion and removal through the cursor keep it valid, even when nodes
/// are split, merged or released underneath it.
pub struct CursorMut<'a, T: 'a, const K: usize = DEFAULT_NODE_CAPACITY, A: NodeAllocator = Global>
{
    index: usize,
    loc: Loc,
    list: &'a mut UnrolledList<T, K, A>,
}

impl<'a, T: 'a, const K: usize, A: NodeAllocator> Clone for Cursor<'a, T, K, A> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            loc: self.loc,
            list: self.list,
        }
    }
}

/// Compare cursors by their positions.
///
/// Only cursors over the same list at the same position are equal.
impl<'a, T: 'a, const K: usize, A: NodeAllocator> PartialEq for Cursor<'a, T, K, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list) && self.index == other.index
    }
}

impl<'a, T: 'a, const K: usize, A: NodeAllocator> Eq for Cursor<'a, T, K, A> {}

macro_rules! impl_cursor {
    ($CURSOR:ident) => {
        impl<'a, T: 'a, const K: usize, A: NodeAllocator> $CURSOR<'a, T, K, A> {
            /// Return the logical index of the cursor.
            pub fn index(&self) -> usize {
                self.index
            }

            /// The [`Position`] the cursor is at. It stays usable with the
            /// list after the cursor is gone, as long as the list is not
            /// restructured around it.
            pub fn position(&self) -> Position {
                self.list.to_position(self.loc)
            }

            /// Returns `true` if the list is empty. See
            /// [`UnrolledList::is_empty`].
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Returns `true` if the cursor is at the end of the list.
            pub fn is_end(&self) -> bool {
                self.index == self.list.len()
            }

            /// Move the cursor to the next element, or return an error at
            /// the end of the list.
            ///
            /// This operation should compute in *O*(1) time.
            pub fn move_next(&mut self) -> Result<(), ListError> {
                if self.is_end() {
                    return Err(ListError::OutOfBounds {
                        index: self.index,
                        len: self.list.len(),
                    });
                }
                self.loc = self.list.step_forward(self.loc);
                self.index += 1;
                Ok(())
            }

            /// Move the cursor to the previous element, or return an error
            /// at the start of the list.
            ///
            /// This operation should compute in *O*(1) time.
            pub fn move_prev(&mut self) -> Result<(), ListError> {
                match self.list.step_back(self.loc) {
                    Some(loc) if self.index > 0 => {
                        self.loc = loc;
                        self.index -= 1;
                        Ok(())
                    }
                    _ => Err(ListError::OutOfBounds {
                        index: self.index,
                        len: self.list.len(),
                    }),
                }
            }

            /// Move forward by `steps`, or stop at the end and return how
            /// many steps were taken.
            ///
            /// This operation should compute in *O*(`steps`) time.
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), usize> {
                (0..steps).try_for_each(|i| self.move_next().map_err(|_| i))
            }

            /// Move backward by `steps`, or stop at the start and return how
            /// many steps were taken.
            ///
            /// This operation should compute in *O*(`steps`) time.
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), usize> {
                (0..steps).try_for_each(|i| self.move_prev().map_err(|_| i))
            }

            /// Move the cursor to logical index `target`, or return an error
            /// when `target > len`. If an error occurs, the cursor stays put.
            ///
            /// This operation should compute in *O*(*n*/`K`) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list: UnrolledList<i32, 2> = (1..=5).collect();
            /// let mut cursor = list.cursor_start();
            ///
            /// assert!(cursor.seek_to(3).is_ok());
            /// assert_eq!(cursor.current(), Some(&4));
            ///
            /// assert!(cursor.seek_to(6).is_err());
            /// assert_eq!(cursor.current(), Some(&4));
            /// ```
            pub fn seek_to(&mut self, target: usize) -> Result<(), ListError> {
                let len = self.list.len();
                if target > len {
                    return Err(ListError::OutOfBounds { index: target, len });
                }
                self.loc = match self.list.loc_of(target) {
                    Some((slot, index)) => (Some(slot), index),
                    None => self.list.end_loc(),
                };
                self.index = target;
                Ok(())
            }

            /// Set the cursor to the first element.
            #[inline]
            pub fn move_to_start(&mut self) {
                self.loc = self.list.begin_loc();
                self.index = 0;
            }

            /// Set the cursor to the end of the list.
            #[inline]
            pub fn move_to_end(&mut self) {
                self.loc = self.list.end_loc();
                self.index = self.list.len();
            }

            /// Return the element before the cursor, or `None` if the cursor
            /// is at the start.
            pub fn previous(&self) -> Option<&T> {
                if self.index == 0 {
                    return None;
                }
                self.list.element(self.list.step_back(self.loc)?)
            }

            /// Return the element after the current one, or `None` if there
            /// is none.
            pub fn peek_next(&self) -> Option<&T> {
                if self.is_end() {
                    return None;
                }
                self.list.element(self.list.step_forward(self.loc))
            }
        }

        impl<'a, T: fmt::Debug + 'a, const K: usize, A: NodeAllocator> fmt::Debug
            for $CURSOR<'a, T, K, A>
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("current", &self.list.element(self.loc))
                    .field("index", &self.index)
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut);
impl_cursor!(Cursor);

impl<'a, T: 'a, const K: usize, A: NodeAllocator> Cursor<'a, T, K, A> {
    pub(crate) fn new(list: &'a UnrolledList<T, K, A>, loc: Loc, index: usize) -> Self {
        Self { index, loc, list }
    }

    /// Return the element at the cursor, or `None` at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32> = [1, 2, 3].into();
    /// assert_eq!(list.cursor(0).current(), Some(&1));
    /// assert_eq!(list.cursor(2).current(), Some(&3));
    /// assert_eq!(list.cursor(3).current(), None);
    /// ```
    pub fn current(&self) -> Option<&'a T> {
        self.list.element(self.loc)
    }

    /// Returns the list the cursor is over.
    pub fn view(&self) -> &'a UnrolledList<T, K, A> {
        self.list
    }
}

impl<'a, T: 'a, const K: usize, A: NodeAllocator> CursorMut<'a, T, K, A> {
    pub(crate) fn new(list: &'a mut UnrolledList<T, K, A>, loc: Loc, index: usize) -> Self {
        Self { index, loc, list }
    }

    /// Return the element at the cursor, or `None` at the end.
    pub fn current(&self) -> Option<&T> {
        self.list.element(self.loc)
    }

    /// Return a mutable reference to the element at the cursor, or `None`
    /// at the end.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.list.element_mut(self.loc)
    }

    /// Return a mutable reference to the element before the cursor, or
    /// `None` at the start.
    pub fn previous_mut(&mut self) -> Option<&mut T> {
        if self.index == 0 {
            return None;
        }
        let loc = self.list.step_back(self.loc)?;
        self.list.element_mut(loc)
    }

    /// Make a read-only cursor borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, T, K, A> {
        Cursor::new(self.list, self.loc, self.index)
    }

    /// Turn into a read-only cursor with the same lifetime.
    pub fn into_cursor(self) -> Cursor<'a, T, K, A> {
        Cursor::new(self.list, self.loc, self.index)
    }

    /// Returns the list the cursor is over.
    pub fn view(&self) -> &UnrolledList<T, K, A> {
        self.list
    }

    /// Insert `item` before the cursor. The cursor stays at the same element
    /// (or the end), so its index grows by one.
    ///
    /// # Panics
    ///
    /// Panics if the allocator refuses a node. See [`CursorMut::try_insert`].
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 3> = [1, 2, 3].into();
    /// let mut cursor = list.cursor_mut(1);
    ///
    /// cursor.insert(4); // becomes [1, 4, 2, 3], splitting the node
    /// assert_eq!(cursor.index(), 2);
    /// assert_eq!(cursor.current(), Some(&2));
    ///
    /// cursor.move_to_end();
    /// cursor.insert(5); // becomes [1, 4, 2, 3, 5]
    /// assert_eq!(cursor.index(), 5);
    /// assert_eq!(cursor.previous(), Some(&5));
    ///
    /// assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![1, 4, 2, 3, 5]);
    /// ```
    pub fn insert(&mut self, item: T) {
        if let Err(err) = self.try_insert(item) {
            panic!("{}", err)
        }
    }

    /// Insert `item` before the cursor, or report an allocator refusal with
    /// the list and the cursor untouched.
    pub fn try_insert(&mut self, item: T) -> Result<(), AllocError> {
        let (slot, index) = self.list.insert_at(self.loc, item)?;
        self.loc = self.list.step_forward((Some(slot), index));
        self.index += 1;
        Ok(())
    }

    /// Remove the element at the cursor and return it, or return `None` at
    /// the end. Afterwards the cursor is at the element that followed.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 4> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(5);
    ///
    /// assert_eq!(cursor.remove(), Some(5));
    /// assert_eq!(cursor.index(), 5);
    /// assert_eq!(cursor.current(), Some(&6));
    ///
    /// cursor.move_to_end();
    /// assert_eq!(cursor.remove(), None);
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        let (Some(slot), index) = self.loc else {
            return None;
        };
        let (value, next) = self.list.erase_at(slot, index)?;
        self.loc = next;
        Some(value)
    }

    /// Remove the element before the cursor and return it, or `None` at the
    /// start. The cursor stays at the same element.
    pub fn backspace(&mut self) -> Option<T> {
        self.move_prev().ok().and_then(|_| self.remove())
    }
}

impl<'a, T: 'a, const K: usize, A: NodeAllocator> From<CursorMut<'a, T, K, A>>
    for Cursor<'a, T, K, A>
{
    fn from(cursor: CursorMut<'a, T, K, A>) -> Self {
        cursor.into_cursor()
    }
}
