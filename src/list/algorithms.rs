use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::alloc::NodeAllocator;
use crate::list::UnrolledList;

impl<T, U, const K: usize, const L: usize, A, B> PartialEq<UnrolledList<U, L, B>>
    for UnrolledList<T, K, A>
where
    T: PartialEq<U>,
    A: NodeAllocator,
    B: NodeAllocator,
{
    /// Lists are equal when they hold equal elements in the same order,
    /// whatever their node capacities or allocators.
    fn eq(&self, other: &UnrolledList<U, L, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T: Eq, const K: usize, A: NodeAllocator> Eq for UnrolledList<T, K, A> {}

impl<T: PartialOrd, const K: usize, A: NodeAllocator> PartialOrd for UnrolledList<T, K, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord, const K: usize, A: NodeAllocator> Ord for UnrolledList<T, K, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T: Clone, const K: usize, A: NodeAllocator + Clone> Clone for UnrolledList<T, K, A> {
    fn clone(&self) -> Self {
        let mut list = Self::new_in(self.allocator().clone());
        list.extend(self.iter().cloned());
        list
    }

    /// Reuses the elements already in `self`, then appends or pops the
    /// difference.
    fn clone_from(&mut self, other: &Self) {
        while self.len() > other.len() {
            self.pop_back();
        }
        let shared = self.len();
        for (elem, elem_other) in self.iter_mut().zip(other) {
            elem.clone_from(elem_other);
        }
        self.extend(other.iter().skip(shared).cloned());
    }
}

impl<T: Hash, const K: usize, A: NodeAllocator> Hash for UnrolledList<T, K, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T, const K: usize, A: NodeAllocator> UnrolledList<T, K, A> {
    /// Returns `true` if the `UnrolledList` contains an element equal to the
    /// given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<i32, 2> = UnrolledList::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// assert_eq!(list.contains(&0), true);
    /// assert_eq!(list.contains(&10), false);
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.iter().any(|e| e == x)
    }
}

#[cfg(test)]
mod tests {
    use crate::list::UnrolledList;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<H: Hash>(value: &H) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_ignores_node_layout() {
        let packed: UnrolledList<i32, 8> = (0..20).collect();
        let mut sparse: UnrolledList<i32, 3> = UnrolledList::new();
        for i in (0..20).rev() {
            sparse.insert(sparse.begin(), i).unwrap();
        }
        assert_eq!(packed, sparse);
        assert_ne!(packed.node_count(), sparse.node_count());

        sparse.pop_back();
        assert_ne!(packed, sparse);
        assert_ne!(sparse, packed);
    }

    #[test]
    fn ordering_and_hash() {
        let a: UnrolledList<i32, 2> = [1, 2, 3].into();
        let b: UnrolledList<i32, 2> = [1, 2, 4].into();
        let c: UnrolledList<i32, 2> = [1, 2].into();
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.clone().cmp(&a), std::cmp::Ordering::Equal);
        assert_eq!(hash_of(&a), hash_of(&a.clone()));
        assert_ne!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn clone_from_grows_and_shrinks() {
        let long: UnrolledList<String, 3> = (0..10).map(|i| i.to_string()).collect();
        let short: UnrolledList<String, 3> = (0..2).map(|i| (i * 100).to_string()).collect();

        let mut target = short.clone();
        target.clone_from(&long);
        assert_eq!(target, long);
        target.validate_invariants().unwrap();

        target.clone_from(&short);
        assert_eq!(target, short);
        target.validate_invariants().unwrap();
        assert!(target.contains(&"100".to_string()));
        assert!(!target.contains(&"9".to_string()));
    }
}
