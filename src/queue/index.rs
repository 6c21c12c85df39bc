//! Token index: cancellation token to the chain of entries that carry it.
//!
//! A token maps to the head of an intrusive doubly linked chain threaded
//! through the arena (`chain_next`/`chain_prev` on each entry). Linking
//! pushes at the head, so same-token entries cancel most-recent-first.
//! A token whose chain empties is removed from the map eagerly.

use std::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use slab::Slab;

use super::entry::TimerEntry;

pub(crate) struct TokenIndex<K> {
    heads: HashMap<K, usize>,
}

impl<K> TokenIndex<K> {
    pub(crate) fn new() -> Self {
        Self {
            heads: HashMap::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heads: HashMap::with_capacity(capacity),
        }
    }

    /// Number of distinct tokens currently indexed.
    pub(crate) fn token_count(&self) -> usize {
        self.heads.len()
    }
}

impl<K: Hash + Eq + Clone> TokenIndex<K> {
    /// Head of the chain for `token`, if any entries carry it.
    pub(crate) fn head_of(&self, token: &K) -> Option<usize> {
        self.heads.get(token).copied()
    }

    /// Links `key` at the head of its token's chain.
    pub(crate) fn link<D, H>(&mut self, arena: &mut Slab<TimerEntry<D, K, H>>, key: usize) {
        let token = arena[key].token.clone();
        match self.heads.entry(token) {
            Entry::Occupied(mut head) => {
                let old_head = *head.get();
                arena[old_head].chain_prev = Some(key);
                arena[key].chain_next = Some(old_head);
                *head.get_mut() = key;
            }
            Entry::Vacant(slot) => {
                slot.insert(key);
            }
        }
    }

    /// Splices `key` out of its chain.
    ///
    /// The caller still owns the entry in the arena; only the links and the
    /// head map are touched here.
    pub(crate) fn unlink<D, H>(&mut self, arena: &mut Slab<TimerEntry<D, K, H>>, key: usize) {
        let (prev, next) = {
            let entry = &mut arena[key];
            (entry.chain_prev.take(), entry.chain_next.take())
        };
        if let Some(prev) = prev {
            arena[prev].chain_next = next;
        }
        if let Some(next) = next {
            arena[next].chain_prev = prev;
        }
        if prev.is_none() {
            // `key` was the head; promote its successor or drop the token.
            match next {
                Some(next) => {
                    if let Some(head) = self.heads.get_mut(&arena[key].token) {
                        debug_assert_eq!(*head, key, "chain head out of sync");
                        *head = next;
                    }
                }
                None => {
                    self.heads.remove(&arena[key].token);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn chains(&self) -> impl Iterator<Item = (&K, usize)> {
        self.heads.iter().map(|(token, &head)| (token, head))
    }
}
