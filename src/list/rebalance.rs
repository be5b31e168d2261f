//! Keeping nodes neither overflowing nor nearly empty.
//!
//! Every function here takes the location an operation is working on and
//! returns where that location ended up once elements have moved between
//! nodes.

use tracing::trace;

use crate::alloc::NodeAllocator;
use crate::error::AllocError;
use crate::list::node::{can_be_merged, move_to_left, move_to_right};
use crate::list::UnrolledList;

impl<T, const K: usize, A: NodeAllocator> UnrolledList<T, K, A> {
    /// Minimum occupancy restored after an element is removed.
    pub(crate) const FILL_FLOOR: usize = K - K / 2;

    /// Splits the full node `slot` so that an element can be inserted at
    /// `index`. The old node keeps `K/2` elements and a fresh node linked
    /// right after it takes the rest; when `index` falls in the right half
    /// the old node keeps one more, so the insertion never overfills either
    /// side.
    ///
    /// The fresh node is taken from `spare` or allocated before anything
    /// moves, so a refusal leaves the list as it was. Returns the node and
    /// index to insert at.
    pub(super) fn split_full_node(
        &mut self,
        slot: usize,
        index: usize,
        spare: &mut Vec<usize>,
    ) -> Result<(usize, usize), AllocError> {
        let fresh = self.acquire_node(spare)?;
        let mut keep = K / 2;
        let target_in_old = index <= keep;
        if !target_in_old {
            keep += 1;
        }
        let (old, new) = self.arena.pair_mut(slot, fresh);
        move_to_right(old, new, K - keep);
        self.link_after(fresh, Some(slot));
        trace!(slot, fresh, keep, "split full node");
        if target_in_old {
            Ok((slot, index))
        } else {
            Ok((fresh, index - keep))
        }
    }

    /// Restores the fill floor of `slot` after a removal, tracking the
    /// location `(slot, index)`.
    ///
    /// In order: merge with the previous node, merge with the next node,
    /// refill from the previous node, refill from the next node. A merge
    /// moves the smaller node into the larger one. Refilling only takes
    /// what the donor can spare without falling under the floor itself.
    pub(super) fn rebalance(&mut self, slot: usize, index: usize) -> (usize, usize) {
        let len = self.arena[slot].len();
        if len >= Self::FILL_FLOOR {
            return (slot, index);
        }
        let (prev, next) = (self.arena[slot].prev, self.arena[slot].next);
        if let Some(prev) = prev {
            if can_be_merged(&self.arena[prev], &self.arena[slot]) {
                return self.merge(prev, slot, (slot, index));
            }
        }
        if let Some(next) = next {
            if can_be_merged(&self.arena[slot], &self.arena[next]) {
                return self.merge(slot, next, (slot, index));
            }
        }
        let need = Self::FILL_FLOOR - len;
        if let Some(prev) = prev {
            if self.arena[prev].len() >= Self::FILL_FLOOR + need {
                let (donor, node) = self.arena.pair_mut(prev, slot);
                let moved = move_to_right(donor, node, need);
                trace!(slot, donor = prev, moved, "refilled node from previous");
                return (slot, index + moved);
            }
        }
        if let Some(next) = next {
            if self.arena[next].len() >= Self::FILL_FLOOR + need {
                let (node, donor) = self.arena.pair_mut(slot, next);
                let moved = move_to_left(node, donor, need);
                trace!(slot, donor = next, moved, "refilled node from next");
            }
        }
        (slot, index)
    }

    /// Merges the adjacent nodes `left` and `right` into whichever is larger
    /// and releases the other. `at` must lie in one of them.
    fn merge(&mut self, left: usize, right: usize, at: (usize, usize)) -> (usize, usize) {
        let left_len = self.arena[left].len();
        let right_len = self.arena[right].len();
        let (l, r) = self.arena.pair_mut(left, right);
        if right_len <= left_len {
            move_to_left(l, r, right_len);
            self.unlink(right);
            self.destroy_node(right);
            trace!(into = left, from = right, "merged node into previous");
            if at.0 == right {
                (left, left_len + at.1)
            } else {
                (left, at.1)
            }
        } else {
            move_to_right(l, r, left_len);
            self.unlink(left);
            self.destroy_node(left);
            trace!(into = right, from = left, "merged node into next");
            if at.0 == left {
                (right, at.1)
            } else {
                (right, left_len + at.1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::list::UnrolledList;

    #[test]
    fn split_keeps_both_halves_non_empty() {
        for at in 0..=5 {
            let mut list: UnrolledList<usize, 5> = (0..5).collect();
            let pos = list.position(at).unwrap();
            list.insert(pos, 99).unwrap();
            assert_eq!(list.node_sizes(), [3, 3], "insert at {}", at);
            let mut expected: Vec<usize> = (0..5).collect();
            expected.insert(at, 99);
            assert!(list.iter().copied().eq(expected));
            list.validate_invariants().unwrap();
        }
    }

    #[test]
    fn split_single_slot_nodes() {
        let mut list: UnrolledList<char, 1> = UnrolledList::new();
        list.push_back('b');
        let pos = list.insert(list.begin(), 'a').unwrap();
        assert_eq!(list.value_at(pos), Ok(&'a'));
        let pos = list.insert(list.end(), 'c').unwrap();
        assert_eq!(list.value_at(pos), Ok(&'c'));
        assert_eq!(list.node_sizes(), [1, 1, 1]);
        assert_eq!(list.iter().collect::<String>(), "abc");
    }

    #[test]
    fn erase_refills_then_merges() {
        // [0 1 2 3 4] [5 6 7 8 9] [10 11 12]
        let mut list: UnrolledList<i32, 5> = (0..13).collect();
        let pos = list.position(10).unwrap();
        // [10 11 12] -> [11 12] is under the floor and too big to merge, so
        // it borrows the last element of the previous node
        let pos = list.erase(pos).unwrap();
        assert_eq!(list.node_sizes(), [5, 4, 3]);
        assert_eq!(list.value_at(pos), Ok(&11));

        // [5 6 7 8] [9 11 12] -> [5 6 7] [8 9 12]
        let pos = list.erase(pos).unwrap();
        assert_eq!(list.node_sizes(), [5, 3, 3]);
        assert_eq!(list.value_at(pos), Ok(&12));

        // [5 6 7] [8 9] fit in one node: the smaller one moves
        let pos = list.erase(pos).unwrap();
        assert_eq!(list.node_sizes(), [5, 5]);
        assert_eq!(pos, list.end());
        assert!(list.iter().copied().eq(0..10));
        list.validate_invariants().unwrap();
    }
}
