use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::alloc::NodeAllocator;
use crate::list::arena::Arena;
use crate::list::node::Node;
use crate::list::{UnrolledList, DEFAULT_NODE_CAPACITY};
use crate::Global;

/// An iterator over the elements of an `UnrolledList`.
///
/// It keeps the location of the next element from each end plus the number
/// of elements left between them, so it never has to compare locations to
/// know when the two ends meet.
///
/// # Examples
///
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list: UnrolledList<i32> = [1, 2, 3].into();
/// let mut iter = list.iter();
///
/// // Won't compile, because list is already borrowed immutably.
/// list.push_back(4);
/// println!("{:?}", iter.next());
/// ```
pub struct Iter<'a, T: 'a, const K: usize = DEFAULT_NODE_CAPACITY> {
    arena: &'a Arena<T, K>,
    front: (usize, usize),
    back: (usize, usize),
    len: usize,
}

impl<'a, T: 'a, const K: usize> Iter<'a, T, K> {
    pub(crate) fn new<A: NodeAllocator>(list: &'a UnrolledList<T, K, A>) -> Self {
        let (front, back) = ends(list);
        Self {
            arena: &list.arena,
            front,
            back,
            len: list.len,
        }
    }
}

/// Locations of the first and last element, or placeholders that are never
/// read when the list is empty.
fn ends<T, const K: usize, A: NodeAllocator>(
    list: &UnrolledList<T, K, A>,
) -> ((usize, usize), (usize, usize)) {
    match (list.first, list.last) {
        (Some(first), Some(last)) => ((first, 0), (last, list.arena[last].len() - 1)),
        _ => ((0, 0), (0, 0)),
    }
}

impl<'a, T: 'a, const K: usize> Clone for Iter<'a, T, K> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            len: self.len,
        }
    }
}

impl<'a, T: fmt::Debug + 'a, const K: usize> fmt::Debug for Iter<'a, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.len).finish()
    }
}

impl<'a, T: 'a, const K: usize> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let arena = self.arena;
        let (slot, index) = self.front;
        let node = &arena[slot];
        let item = node.get(index)?;
        self.len -= 1;
        if index + 1 < node.len() {
            self.front = (slot, index + 1);
        } else if let Some(next) = node.next {
            self.front = (next, 0);
        }
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, T: 'a, const K: usize> DoubleEndedIterator for Iter<'a, T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let arena = self.arena;
        let (slot, index) = self.back;
        let node = &arena[slot];
        let item = node.get(index)?;
        self.len -= 1;
        if index > 0 {
            self.back = (slot, index - 1);
        } else if let Some(prev) = node.prev {
            self.back = (prev, arena[prev].len() - 1);
        }
        Some(item)
    }
}

impl<'a, T: 'a, const K: usize> ExactSizeIterator for Iter<'a, T, K> {}

impl<'a, T: 'a, const K: usize> FusedIterator for Iter<'a, T, K> {}

/// A mutable iterator over the elements of an `UnrolledList`.
///
/// The node table is only read; elements are reached through raw node
/// pointers so that no reference to a node overlaps an element handed out
/// earlier.
pub struct IterMut<'a, T: 'a, const K: usize = DEFAULT_NODE_CAPACITY> {
    arena: &'a Arena<T, K>,
    front: (usize, usize),
    back: (usize, usize),
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T: 'a, const K: usize> IterMut<'a, T, K> {
    pub(crate) fn new<A: NodeAllocator>(list: &'a mut UnrolledList<T, K, A>) -> Self {
        let (front, back) = ends(list);
        let len = list.len;
        Self {
            arena: &list.arena,
            front,
            back,
            len,
            _marker: PhantomData,
        }
    }

    fn node(&self, slot: usize) -> Option<*mut Node<T, K>> {
        self.arena.node_ptr(slot).map(|node| node.as_ptr())
    }
}

impl<'a, T: fmt::Debug + 'a, const K: usize> fmt::Debug for IterMut<'a, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.len).finish()
    }
}

impl<'a, T: 'a, const K: usize> Iterator for IterMut<'a, T, K> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let (slot, index) = self.front;
        let node = self.node(slot)?;
        // SAFETY: `node` is live for `'a` since the list is mutably borrowed,
        // `index` is below its length, and each element is yielded once.
        unsafe {
            let len = Node::raw_len(node);
            if index >= len {
                return None;
            }
            let item = Node::raw_element(node, index);
            self.len -= 1;
            if index + 1 < len {
                self.front = (slot, index + 1);
            } else if let Some(next) = Node::raw_next(node) {
                self.front = (next, 0);
            }
            Some(&mut *item)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, T: 'a, const K: usize> DoubleEndedIterator for IterMut<'a, T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let (slot, index) = self.back;
        let node = self.node(slot)?;
        // SAFETY: see `next`.
        unsafe {
            if index >= Node::raw_len(node) {
                return None;
            }
            let item = Node::raw_element(node, index);
            self.len -= 1;
            if index > 0 {
                self.back = (slot, index - 1);
            } else if let Some(prev) = Node::raw_prev(node) {
                let prev_len = self.node(prev).map_or(0, |prev| Node::raw_len(prev));
                self.back = (prev, prev_len.saturating_sub(1));
            }
            Some(&mut *item)
        }
    }
}

impl<'a, T: 'a, const K: usize> ExactSizeIterator for IterMut<'a, T, K> {}

impl<'a, T: 'a, const K: usize> FusedIterator for IterMut<'a, T, K> {}

/// An owning iterator over the elements of an `UnrolledList`.
pub struct IntoIter<T, const K: usize = DEFAULT_NODE_CAPACITY, A: NodeAllocator = Global> {
    list: UnrolledList<T, K, A>,
}

impl<T: fmt::Debug, const K: usize, A: NodeAllocator> fmt::Debug for IntoIter<T, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T, const K: usize, A: NodeAllocator> Iterator for IntoIter<T, K, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const K: usize, A: NodeAllocator> DoubleEndedIterator for IntoIter<T, K, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const K: usize, A: NodeAllocator> ExactSizeIterator for IntoIter<T, K, A> {}

impl<T, const K: usize, A: NodeAllocator> FusedIterator for IntoIter<T, K, A> {}

impl<T, const K: usize, A: NodeAllocator> IntoIterator for UnrolledList<T, K, A> {
    type Item = T;
    type IntoIter = IntoIter<T, K, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T, const K: usize, A: NodeAllocator> IntoIterator for &'a UnrolledList<T, K, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const K: usize, A: NodeAllocator> IntoIterator for &'a mut UnrolledList<T, K, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const K: usize, A: NodeAllocator + Default> FromIterator<T> for UnrolledList<T, K, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new_in(A::default());
        list.extend(iter);
        list
    }
}

impl<T, const K: usize, A: NodeAllocator + Default, const N: usize> From<[T; N]>
    for UnrolledList<T, K, A>
{
    fn from(array: [T; N]) -> Self {
        array.into_iter().collect()
    }
}

/// Appends every element to the back of the list.
///
/// # Panics
///
/// Panics if the allocator refuses a node. See
/// [`UnrolledList::try_extend`].
impl<T, const K: usize, A: NodeAllocator> Extend<T> for UnrolledList<T, K, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|elt| self.push_back(elt));
    }
}

impl<'a, T: 'a + Copy, const K: usize, A: NodeAllocator> Extend<&'a T> for UnrolledList<T, K, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

unsafe impl<T: Send, const K: usize> Send for IterMut<'_, T, K> {}

unsafe impl<T: Sync, const K: usize> Sync for IterMut<'_, T, K> {}

#[cfg(test)]
mod tests {
    use crate::UnrolledList;
    use std::fmt::Debug;

    #[test]
    fn test_iter() {
        macro_rules! test_iter {
            ($FN:ident, $ITER:ident $(, $REV:ident)?) => {
                fn $FN<T, I, const K: usize>(input: I, mid: usize)
                where
                    T: Eq + Debug + Clone,
                    I: IntoIterator<Item = T>,
                {
                    #[allow(unused_mut)]
                    let mut vec: Vec<T> = input.into_iter().collect();
                    #[allow(unused_mut)]
                    let mut list: UnrolledList<T, K> = vec.iter().cloned().collect();
                    let len = vec.len();
                    let mut iter = list.$ITER() $( .$REV() )?;
                    for (i, item) in vec.$ITER() $( .$REV() )?.enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - i - 1);
                    }
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next_back(), None);
                    assert_eq!(iter.len(), 0);

                    let mut iter = list.$ITER() $( .$REV() )?;
                    for (i, item) in vec.$ITER() $( .$REV() )? .take(mid).enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - i - 1);
                    }
                    let mut iter = iter.rev();
                    for (i, item) in vec.$ITER() $( .$REV() )? .skip(mid).rev().enumerate() {
                        assert_eq!(iter.next(), Some(item));
                        assert_eq!(iter.len(), len - mid - i - 1);
                    }
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next(), None);
                    assert_eq!(iter.next_back(), None);
                    assert_eq!(iter.len(), 0);
                }
            };
        }
        test_iter!(test_iter, iter);
        test_iter!(test_iter_mut, iter_mut);
        test_iter!(test_back_iter, iter, rev);
        test_iter!(test_back_iter_mut, iter_mut, rev);

        fn test_case<T, I>(input: I, mid: usize)
        where
            T: Eq + Debug + Clone,
            I: IntoIterator<Item = T> + Clone,
        {
            test_iter::<_, _, 1>(input.clone(), mid);
            test_iter::<_, _, 3>(input.clone(), mid);
            test_iter_mut::<_, _, 2>(input.clone(), mid);
            test_iter_mut::<_, _, 10>(input.clone(), mid);
            test_back_iter::<_, _, 3>(input.clone(), mid);
            test_back_iter::<_, _, 4>(input.clone(), mid);
            test_back_iter_mut::<_, _, 1>(input.clone(), mid);
            test_back_iter_mut::<_, _, 5>(input, mid);
        }
        test_case(0..10, 10);
        test_case(0..10, 8);
        test_case(0..10, 5);
        test_case(0..10, 2);
        test_case(0..10, 0);
        test_case(0..2, 2);
        test_case(0..2, 1);
        test_case(0..2, 0);
        test_case(0..1, 1);
        test_case(0..1, 0);
        test_case(0..0, 0);
    }

    #[test]
    fn iter_after_restructuring() {
        let mut list: UnrolledList<i32, 4> = UnrolledList::new();
        for i in 0..30 {
            list.push_front(i);
        }
        let pos = list.position(10).unwrap();
        list.insert_n(pos, 3, -1).unwrap();
        let first = list.position(2).unwrap();
        let last = list.position(20).unwrap();
        list.erase_range(first, last).unwrap();

        let expected: Vec<i32> = list.iter().copied().collect();
        let reversed: Vec<i32> = list.iter().rev().copied().collect();
        assert_eq!(expected.len(), list.len());
        assert!(expected.iter().rev().eq(reversed.iter()));

        for x in &mut list {
            *x += 1;
        }
        assert!(list.iter().copied().eq(expected.iter().map(|x| x + 1)));
    }

    #[test]
    fn into_iter_both_ends() {
        let list: UnrolledList<String, 2> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut iter = list.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().as_deref(), Some("a"));
        assert_eq!(iter.next_back().as_deref(), Some("e"));
        assert_eq!(iter.next().as_deref(), Some("b"));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.last().as_deref(), Some("d"));
    }

    #[test]
    fn extend_and_from_array() {
        let mut list: UnrolledList<u8, 3> = [1, 2].into();
        list.extend(&[3, 4]);
        list.extend(vec![5]);
        assert!(list.iter().copied().eq(1..=5));
        assert_eq!(format!("{:?}", list), "[1, 2, 3, 4, 5]");
    }
}
