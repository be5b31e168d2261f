use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::list::node::Node;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// A checked handle to a node: the slot it lives in plus the generation of
/// that slot when the handle was taken. Handles outlive their node safely;
/// they simply stop resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeRef {
    arena: u64,
    slot: usize,
    generation: u32,
}

struct Slot<T, const K: usize> {
    generation: u32,
    node: Option<NonNull<Node<T, K>>>,
}

/// Owns every node of one list. Nodes are boxed individually so that their
/// addresses stay put while the slot table grows, and slots are recycled
/// through a free list.
pub(crate) struct Arena<T, const K: usize> {
    id: u64,
    slots: Vec<Slot<T, K>>,
    vacant: Vec<usize>,
    live: usize,
    _marker: PhantomData<Box<Node<T, K>>>,
}

impl<T, const K: usize> Arena<T, K> {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            vacant: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Number of nodes currently owned.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn insert(&mut self, node: Node<T, K>) -> usize {
        let node = NonNull::from(Box::leak(Box::new(node)));
        self.live += 1;
        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot].node = Some(node);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Takes the node out of `slot`. Every handle to it stops resolving.
    pub(crate) fn remove(&mut self, slot: usize) -> Option<Box<Node<T, K>>> {
        let entry = self.slots.get_mut(slot)?;
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(slot);
        self.live -= 1;
        // SAFETY: the pointer came from `Box::leak` in `insert` and has just
        // been taken out of the table, so it is reclaimed exactly once.
        Some(unsafe { Box::from_raw(node.as_ptr()) })
    }

    pub(crate) fn node_ptr(&self, slot: usize) -> Option<NonNull<Node<T, K>>> {
        self.slots.get(slot).and_then(|entry| entry.node)
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&Node<T, K>> {
        // SAFETY: live pointers in the table are valid, and the returned
        // borrow is tied to `&self`.
        self.node_ptr(slot).map(|node| unsafe { node.as_ref() })
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Node<T, K>> {
        // SAFETY: live pointers in the table are valid and uniquely owned by
        // the arena, and the returned borrow is tied to `&mut self`.
        self.node_ptr(slot).map(|mut node| unsafe { node.as_mut() })
    }

    /// Borrows two distinct nodes mutably at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` or either slot is vacant.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Node<T, K>, &mut Node<T, K>) {
        assert_ne!(a, b, "cannot borrow one node twice");
        let (Some(mut a), Some(mut b)) = (self.node_ptr(a), self.node_ptr(b)) else {
            panic!("dangling node link");
        };
        // SAFETY: the two nodes are distinct boxes owned by the arena.
        unsafe { (a.as_mut(), b.as_mut()) }
    }

    pub(crate) fn node_ref(&self, slot: usize) -> NodeRef {
        NodeRef {
            arena: self.id,
            slot,
            generation: self.slots[slot].generation,
        }
    }

    /// Turns a handle back into a slot if its node is still alive in this
    /// arena.
    pub(crate) fn resolve(&self, node: NodeRef) -> Option<usize> {
        if node.arena != self.id {
            return None;
        }
        let entry = self.slots.get(node.slot)?;
        (entry.node.is_some() && entry.generation == node.generation).then_some(node.slot)
    }
}

impl<T, const K: usize> Index<usize> for Arena<T, K> {
    type Output = Node<T, K>;

    fn index(&self, slot: usize) -> &Node<T, K> {
        match self.get(slot) {
            Some(node) => node,
            None => panic!("dangling node link"),
        }
    }
}

impl<T, const K: usize> IndexMut<usize> for Arena<T, K> {
    fn index_mut(&mut self, slot: usize) -> &mut Node<T, K> {
        match self.get_mut(slot) {
            Some(node) => node,
            None => panic!("dangling node link"),
        }
    }
}

impl<T, const K: usize> Drop for Arena<T, K> {
    fn drop(&mut self) {
        for slot in 0..self.slots.len() {
            drop(self.remove(slot));
        }
    }
}

unsafe impl<T: Send, const K: usize> Send for Arena<T, K> {}

unsafe impl<T: Sync, const K: usize> Sync for Arena<T, K> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_recycles_slots() {
        let mut arena: Arena<i32, 4> = Arena::new();
        let a = arena.insert(Node::new());
        let b = arena.insert(Node::new());
        assert_ne!(a, b);
        assert_eq!(arena.live(), 2);

        let handle = arena.node_ref(a);
        assert_eq!(arena.resolve(handle), Some(a));
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.resolve(handle), None);

        let c = arena.insert(Node::new());
        assert_eq!(c, a);
        assert_eq!(arena.resolve(handle), None);
        assert_eq!(arena.resolve(arena.node_ref(c)), Some(c));
        assert_eq!(arena.live(), 2);
    }

    #[test]
    fn arena_rejects_foreign_handles() {
        let mut one: Arena<i32, 4> = Arena::new();
        let mut other: Arena<i32, 4> = Arena::new();
        let slot = one.insert(Node::new());
        other.insert(Node::new());
        assert_eq!(other.resolve(one.node_ref(slot)), None);
    }

    #[test]
    fn arena_pair_mut() {
        let mut arena: Arena<i32, 4> = Arena::new();
        let a = arena.insert(Node::new());
        let b = arena.insert(Node::new());
        let (left, right) = arena.pair_mut(a, b);
        left.push_back(1).unwrap();
        right.push_back(2).unwrap();
        assert_eq!(arena[a].front(), Some(&1));
        assert_eq!(arena[b].front(), Some(&2));
    }
}
