//! Array-backed min-heap over arena keys with cached positions.
//!
//! The heap stores arena keys, not entries; the entries live in the queue's
//! slab. Every entry caches its current slot, and every swap re-homes the
//! cache on both sides, which is what makes arbitrary removal O(log n)
//! instead of a linear scan.

use slab::Slab;

use crate::order::DeadlineOrder;

use super::entry::{NO_SLOT, TimerEntry};

pub(crate) struct DeadlineHeap {
    slots: Vec<usize>,
}

impl DeadlineHeap {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Arena key of the earliest entry, if any.
    pub(crate) fn peek(&self) -> Option<usize> {
        self.slots.first().copied()
    }

    /// Inserts `key` and returns true when it became the root.
    pub(crate) fn insert<D, K, H, C>(
        &mut self,
        arena: &mut Slab<TimerEntry<D, K, H>>,
        order: &C,
        key: usize,
    ) -> bool
    where
        C: DeadlineOrder<D>,
    {
        let slot = self.slots.len();
        arena[key].heap_slot = slot;
        self.slots.push(key);
        self.sift_up(arena, order, slot);
        self.slots[0] == key
    }

    /// Removes `key` from whatever position it currently occupies.
    ///
    /// The entry displaced into the vacated slot sifts in exactly one
    /// direction: up when it now sorts before its new parent, down
    /// otherwise.
    pub(crate) fn remove<D, K, H, C>(
        &mut self,
        arena: &mut Slab<TimerEntry<D, K, H>>,
        order: &C,
        key: usize,
    ) where
        C: DeadlineOrder<D>,
    {
        let slot = arena[key].heap_slot;
        debug_assert!(slot != NO_SLOT && self.slots[slot] == key, "stale heap slot");

        if self.slots.len() > 1 {
            let last = self.slots.len() - 1;
            self.swap_slots(arena, slot, last);
            self.slots.pop();
            arena[key].heap_slot = NO_SLOT;
            if slot < self.slots.len() {
                if slot > 0 && self.sorts_before(arena, order, slot, (slot - 1) / 2) {
                    self.sift_up(arena, order, slot);
                } else {
                    self.sift_down(arena, order, slot);
                }
            }
        } else {
            self.slots.clear();
            arena[key].heap_slot = NO_SLOT;
        }
    }

    /// Compares the entries at two heap positions through the ordering.
    fn sorts_before<D, K, H, C>(
        &self,
        arena: &Slab<TimerEntry<D, K, H>>,
        order: &C,
        a: usize,
        b: usize,
    ) -> bool
    where
        C: DeadlineOrder<D>,
    {
        order.sorts_before(&arena[self.slots[a]].deadline, &arena[self.slots[b]].deadline)
    }

    fn sift_up<D, K, H, C>(
        &mut self,
        arena: &mut Slab<TimerEntry<D, K, H>>,
        order: &C,
        mut slot: usize,
    ) where
        C: DeadlineOrder<D>,
    {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.sorts_before(arena, order, slot, parent) {
                break;
            }
            self.swap_slots(arena, slot, parent);
            slot = parent;
        }
    }

    fn sift_down<D, K, H, C>(
        &mut self,
        arena: &mut Slab<TimerEntry<D, K, H>>,
        order: &C,
        mut slot: usize,
    ) where
        C: DeadlineOrder<D>,
    {
        loop {
            let left = 2 * slot + 1;
            if left >= self.slots.len() {
                break;
            }
            let right = left + 1;
            // The smaller child is picked through the ordering, like every
            // other comparison here.
            let child = if right < self.slots.len() && self.sorts_before(arena, order, right, left)
            {
                right
            } else {
                left
            };
            if !self.sorts_before(arena, order, child, slot) {
                break;
            }
            self.swap_slots(arena, slot, child);
            slot = child;
        }
    }

    /// Swaps two heap positions and re-homes both cached slots.
    fn swap_slots<D, K, H>(
        &mut self,
        arena: &mut Slab<TimerEntry<D, K, H>>,
        a: usize,
        b: usize,
    ) {
        self.slots.swap(a, b);
        arena[self.slots[a]].heap_slot = a;
        arena[self.slots[b]].heap_slot = b;
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[usize] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{NaturalOrder, order_fn};

    type Arena = Slab<TimerEntry<u64, u32, ()>>;

    fn enqueue(arena: &mut Arena, heap: &mut DeadlineHeap, deadline: u64) -> (usize, bool) {
        let key = arena.insert(TimerEntry::new(deadline, 0, ()));
        let became_root = heap.insert(arena, &NaturalOrder, key);
        (key, became_root)
    }

    fn assert_heap_consistent(arena: &Arena, heap: &DeadlineHeap) {
        let slots = heap.slots();
        for (pos, &key) in slots.iter().enumerate() {
            assert_eq!(arena[key].heap_slot, pos, "slot cache out of date");
            if pos > 0 {
                let parent = slots[(pos - 1) / 2];
                assert!(
                    arena[parent].deadline <= arena[key].deadline,
                    "heap property violated at position {pos}"
                );
            }
        }
    }

    #[test]
    fn insert_reports_new_root() {
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();

        assert!(enqueue(&mut arena, &mut heap, 5).1);
        assert!(enqueue(&mut arena, &mut heap, 2).1);
        assert!(!enqueue(&mut arena, &mut heap, 8).1);
        // An equal deadline does not displace the current root.
        assert!(!enqueue(&mut arena, &mut heap, 2).1);
        assert_heap_consistent(&arena, &heap);
    }

    #[test]
    fn peek_tracks_minimum() {
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();
        assert_eq!(heap.peek(), None);

        for deadline in [9, 4, 7, 1, 6] {
            enqueue(&mut arena, &mut heap, deadline);
        }
        let root = heap.peek().unwrap();
        assert_eq!(arena[root].deadline, 1);
        assert_heap_consistent(&arena, &heap);
    }

    #[test]
    fn remove_root_restores_heap() {
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();
        for deadline in [3, 1, 4, 1, 5, 9, 2, 6] {
            enqueue(&mut arena, &mut heap, deadline);
        }

        let mut popped = Vec::new();
        while let Some(root) = heap.peek() {
            popped.push(arena[root].deadline);
            heap.remove(&mut arena, &NaturalOrder, root);
            arena.remove(root);
            assert_heap_consistent(&arena, &heap);
        }
        assert_eq!(popped, vec![1, 1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn remove_interior_sifts_one_direction() {
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();
        let mut keys = Vec::new();
        for deadline in [10, 20, 30, 40, 50, 60, 70] {
            keys.push(enqueue(&mut arena, &mut heap, deadline).0);
        }

        // Removing an interior entry must leave the rest consistent whether
        // the displaced entry needs to move up or down.
        heap.remove(&mut arena, &NaturalOrder, keys[1]);
        arena.remove(keys[1]);
        assert_heap_consistent(&arena, &heap);

        heap.remove(&mut arena, &NaturalOrder, keys[5]);
        arena.remove(keys[5]);
        assert_heap_consistent(&arena, &heap);

        assert_eq!(heap.len(), 5);
        assert_eq!(arena[heap.peek().unwrap()].deadline, 10);
    }

    #[test]
    fn remove_last_entry_clears_heap() {
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();
        let (key, _) = enqueue(&mut arena, &mut heap, 42);

        heap.remove(&mut arena, &NaturalOrder, key);
        assert!(heap.is_empty());
        assert_eq!(arena[key].heap_slot, NO_SLOT);
    }

    #[test]
    fn custom_ordering_drives_child_selection() {
        // A max-first ordering inverts everything, including the pick of the
        // smaller child during sift-down. If any comparison bypassed the
        // ordering, popping would not come out sorted.
        let reversed = order_fn(|a: &u64, b: &u64| a > b);
        let mut arena = Arena::new();
        let mut heap = DeadlineHeap::new();
        for deadline in [3, 8, 1, 9, 4, 7, 2] {
            let key = arena.insert(TimerEntry::new(deadline, 0, ()));
            heap.insert(&mut arena, &reversed, key);
        }

        let mut popped = Vec::new();
        while let Some(root) = heap.peek() {
            popped.push(arena[root].deadline);
            heap.remove(&mut arena, &reversed, root);
            arena.remove(root);
        }
        assert_eq!(popped, vec![9, 8, 7, 4, 3, 2, 1]);
    }
}
