//! Deadline-ordered timer queue with token cancellation.
//!
//! [`TimerQueue`] owns every pending entry in a slab arena and keeps two
//! views over it: a binary min-heap ordered by deadline (what fires next)
//! and a hash index from cancellation token to the chain of entries that
//! carry it (what a cancel removes). Both views are updated together inside
//! each operation, so they never disagree between calls.
//!
//! The queue is single-threaded and non-reentrant: one call completes
//! before the next starts, and handlers must not call back into the queue
//! that invoked them.

mod entry;
mod heap;
mod index;

pub use entry::{BoxedHandler, ErasedHandler, FnHandler, TimerHandler, handler_fn};

use std::fmt;
use std::hash::Hash;

use slab::Slab;

use crate::order::{DeadlineOrder, NaturalOrder};
use crate::tracing_compat::queue_trace;

use entry::TimerEntry;
use heap::DeadlineHeap;
use index::TokenIndex;

/// A timer scheduling queue for a single-threaded event loop.
///
/// Generic over the deadline type `D`, the cancellation token `K`, the
/// handler capability `H`, and the deadline ordering `C` (defaulting to the
/// `Ord`-based [`NaturalOrder`]).
///
/// Tokens are caller-defined grouping keys and need not be unique: several
/// timers may share one token, and [`cancel`](Self::cancel) removes them
/// all, most recently scheduled first.
///
/// Dropping the queue drops any still-pending handlers without invoking
/// either terminal callback; the exactly-once guarantee covers entries
/// removed through [`dispatch_due`](Self::dispatch_due) and
/// [`cancel`](Self::cancel).
///
/// # Example
///
/// ```
/// use deadline_queue::{BoxedHandler, TimerQueue, handler_fn};
///
/// let mut queue: TimerQueue<u64, &str, BoxedHandler> = TimerQueue::new();
/// queue.enqueue(100, "read", Box::new(handler_fn(|| (), || ())));
/// queue.enqueue(40, "write", Box::new(handler_fn(|| (), || ())));
///
/// // The loop bounds its blocking wait on the earliest pending deadline.
/// assert_eq!(queue.peek_deadline(), Some(&40));
///
/// // A token cancels every timer scheduled under it.
/// assert_eq!(queue.cancel(&"read"), 1);
/// assert_eq!(queue.dispatch_due(&50), 1);
/// assert!(queue.is_empty());
/// ```
pub struct TimerQueue<D, K, H, C = NaturalOrder> {
    entries: Slab<TimerEntry<D, K, H>>,
    heap: DeadlineHeap,
    index: TokenIndex<K>,
    order: C,
}

impl<D, K, H> TimerQueue<D, K, H>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty queue with the `Ord`-based ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ordering(NaturalOrder)
    }

    /// Creates an empty queue pre-sized for `capacity` pending timers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Slab::with_capacity(capacity),
            heap: DeadlineHeap::with_capacity(capacity),
            index: TokenIndex::with_capacity(capacity),
            order: NaturalOrder,
        }
    }
}

impl<D, K, H> Default for TimerQueue<D, K, H>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, K, H, C> TimerQueue<D, K, H, C>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty queue with a caller-supplied deadline ordering.
    ///
    /// ```
    /// use deadline_queue::{BoxedHandler, TimerQueue, WrappingOrder, handler_fn};
    ///
    /// // Deadlines on a wrapping tick clock: an enqueue just past rollover
    /// // still sorts after one just before it.
    /// let mut queue: TimerQueue<u64, u32, BoxedHandler, WrappingOrder> =
    ///     TimerQueue::with_ordering(WrappingOrder);
    /// queue.enqueue(u64::MAX - 2, 0, Box::new(handler_fn(|| (), || ())));
    /// assert!(!queue.enqueue(1, 1, Box::new(handler_fn(|| (), || ()))));
    /// ```
    #[must_use]
    pub fn with_ordering(order: C) -> Self {
        Self {
            entries: Slab::new(),
            heap: DeadlineHeap::new(),
            index: TokenIndex::new(),
            order,
        }
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<D, K, H, C> TimerQueue<D, K, H, C>
where
    K: Hash + Eq + Clone,
    H: TimerHandler,
    C: DeadlineOrder<D>,
{
    /// Schedules `handler` to fire at `deadline` under `token`.
    ///
    /// Returns true when this entry is now the earliest pending deadline,
    /// in which case an event loop blocked on the previous minimum needs
    /// its wait timeout re-armed. An entry that ties the current minimum
    /// does not count as a new earliest.
    pub fn enqueue(&mut self, deadline: D, token: K, handler: H) -> bool {
        let key = self
            .entries
            .insert(TimerEntry::new(deadline, token, handler));
        self.index.link(&mut self.entries, key);
        let became_earliest = self.heap.insert(&mut self.entries, &self.order, key);
        queue_trace!(
            pending = self.entries.len(),
            became_earliest,
            "timer enqueued"
        );
        became_earliest
    }

    /// The earliest pending deadline.
    ///
    /// # Panics
    ///
    /// Panics when the queue is empty. Calling this without checking
    /// [`is_empty`](Self::is_empty) first is a bug in the caller; use
    /// [`peek_deadline`](Self::peek_deadline) for the fallible form.
    #[must_use]
    pub fn earliest_deadline(&self) -> &D {
        let key = self
            .heap
            .peek()
            .expect("earliest_deadline on an empty queue");
        &self.entries[key].deadline
    }

    /// The earliest pending deadline, or `None` when nothing is pending.
    #[must_use]
    pub fn peek_deadline(&self) -> Option<&D> {
        self.heap.peek().map(|key| &self.entries[key].deadline)
    }

    /// Fires every entry whose deadline sorts strictly before `now`.
    ///
    /// Entries fire in non-decreasing deadline order; each is removed from
    /// both internal structures before its [`TimerHandler::fire`] runs.
    /// Returns the number of timers fired.
    pub fn dispatch_due(&mut self, now: &D) -> usize {
        let mut fired = 0;
        while let Some(root) = self.heap.peek() {
            if !self.order.sorts_before(&self.entries[root].deadline, now) {
                break;
            }
            let entry = self.detach(root);
            fired += 1;
            entry.handler.fire();
        }
        queue_trace!(fired, pending = self.entries.len(), "dispatched due timers");
        fired
    }

    /// Cancels every entry currently scheduled under `token`.
    ///
    /// Entries cancel most recently scheduled first; each is removed from
    /// both internal structures before its [`TimerHandler::cancel`] runs.
    /// An unknown token is a no-op. Returns the number of timers cancelled.
    pub fn cancel(&mut self, token: &K) -> usize {
        let mut cancelled = 0;
        let mut cursor = self.index.head_of(token);
        while let Some(key) = cursor {
            // Read the successor before this entry is detached and consumed.
            cursor = self.entries[key].chain_next;
            let entry = self.detach(key);
            cancelled += 1;
            entry.handler.cancel();
        }
        queue_trace!(cancelled, "cancelled timers for token");
        cancelled
    }

    /// Unlinks `key` from heap and index and takes the entry out of the
    /// arena. After this the entry is unreachable from the queue.
    fn detach(&mut self, key: usize) -> TimerEntry<D, K, H> {
        self.heap.remove(&mut self.entries, &self.order, key);
        self.index.unlink(&mut self.entries, key);
        self.entries.remove(key)
    }
}

impl<D, K, H, C> fmt::Debug for TimerQueue<D, K, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.entries.len())
            .field("tokens", &self.index.token_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl<D, K, H, C> TimerQueue<D, K, H, C>
where
    K: Hash + Eq + Clone,
    C: DeadlineOrder<D>,
{
    /// Checks every structural invariant: slot caches true, heap property
    /// over the ordering, chains complete and well linked, no token indexed
    /// without entries.
    pub(crate) fn assert_invariants(&self) {
        let slots = self.heap.slots();
        assert_eq!(slots.len(), self.entries.len());
        for (pos, &key) in slots.iter().enumerate() {
            assert_eq!(self.entries[key].heap_slot, pos, "slot cache out of date");
            if pos > 0 {
                let parent = slots[(pos - 1) / 2];
                assert!(
                    !self.order.sorts_before(
                        &self.entries[key].deadline,
                        &self.entries[parent].deadline
                    ),
                    "heap property violated at position {pos}"
                );
            }
        }

        let mut chained = hashbrown::HashSet::new();
        for (token, head) in self.index.chains() {
            let mut cursor = Some(head);
            let mut prev = None;
            while let Some(key) = cursor {
                let entry = &self.entries[key];
                assert!(entry.token == *token, "entry chained under wrong token");
                assert_eq!(entry.chain_prev, prev, "chain back-link out of sync");
                assert!(chained.insert(key), "entry linked into two chains");
                prev = Some(key);
                cursor = entry.chain_next;
            }
            assert!(prev.is_some(), "token indexed with an empty chain");
        }
        assert_eq!(chained.len(), self.entries.len());
    }
}
