//! Entry storage and the handler capability.

/// Sentinel heap position for an entry that is not currently in the heap.
pub(crate) const NO_SLOT: usize = usize::MAX;

/// Terminal callback capability carried by every pending timer.
///
/// Exactly one of [`fire`](Self::fire) or [`cancel`](Self::cancel) runs for
/// each scheduled entry, exactly once. Both consume the handler, so a second
/// invocation does not typecheck. The queue removes the entry from both of
/// its internal structures *before* invoking either method; a handler that
/// panics propagates to the caller but cannot corrupt the queue or leak the
/// entry.
pub trait TimerHandler {
    /// The timer's deadline passed and it was dispatched.
    fn fire(self);

    /// The timer was cancelled before its deadline.
    fn cancel(self);
}

/// Object-safe form of [`TimerHandler`].
///
/// [`TimerHandler`] consumes `self` by value and is therefore not usable as
/// a trait object. Queues that must hold handlers of more than one concrete
/// type store a [`BoxedHandler`] instead; the blanket impl below erases any
/// `TimerHandler` into one.
pub trait ErasedHandler {
    /// Boxed form of [`TimerHandler::fire`].
    fn fire_boxed(self: Box<Self>);

    /// Boxed form of [`TimerHandler::cancel`].
    fn cancel_boxed(self: Box<Self>);
}

impl<H: TimerHandler> ErasedHandler for H {
    fn fire_boxed(self: Box<Self>) {
        (*self).fire();
    }

    fn cancel_boxed(self: Box<Self>) {
        (*self).cancel();
    }
}

/// A heterogeneous handler slot.
///
/// ```
/// use deadline_queue::{BoxedHandler, TimerQueue, handler_fn};
///
/// let mut queue: TimerQueue<u64, u32, BoxedHandler> = TimerQueue::new();
/// queue.enqueue(1, 7, Box::new(handler_fn(|| (), || ())));
/// ```
pub type BoxedHandler = Box<dyn ErasedHandler>;

impl TimerHandler for BoxedHandler {
    fn fire(self) {
        self.fire_boxed();
    }

    fn cancel(self) {
        self.cancel_boxed();
    }
}

/// Handler built from a pair of closures.
///
/// Constructed by [`handler_fn`].
pub struct FnHandler<F, G> {
    on_fire: F,
    on_cancel: G,
}

/// Builds a [`TimerHandler`] from `on_fire` and `on_cancel` closures.
///
/// # Example
///
/// ```
/// use deadline_queue::{TimerHandler, handler_fn};
///
/// let handler = handler_fn(|| println!("due"), || println!("dropped"));
/// handler.fire();
/// ```
pub fn handler_fn<F, G>(on_fire: F, on_cancel: G) -> FnHandler<F, G>
where
    F: FnOnce(),
    G: FnOnce(),
{
    FnHandler { on_fire, on_cancel }
}

impl<F, G> TimerHandler for FnHandler<F, G>
where
    F: FnOnce(),
    G: FnOnce(),
{
    fn fire(self) {
        (self.on_fire)();
    }

    fn cancel(self) {
        (self.on_cancel)();
    }
}

/// One scheduled operation, owned by the queue's arena until it reaches a
/// terminal state.
///
/// The entry carries its own position bookkeeping: the cached heap slot
/// (kept true by every heap swap) and the intrusive chain links for the
/// token index. Links are arena keys, never addresses.
pub(crate) struct TimerEntry<D, K, H> {
    pub(crate) deadline: D,
    pub(crate) token: K,
    pub(crate) handler: H,
    /// Cached heap position; `NO_SLOT` while detached.
    pub(crate) heap_slot: usize,
    /// Arena key of the next entry sharing this token.
    pub(crate) chain_next: Option<usize>,
    /// Arena key of the previous entry sharing this token.
    pub(crate) chain_prev: Option<usize>,
}

impl<D, K, H> TimerEntry<D, K, H> {
    pub(crate) fn new(deadline: D, token: K, handler: H) -> Self {
        Self {
            deadline,
            token,
            handler,
            heap_slot: NO_SLOT,
            chain_next: None,
            chain_prev: None,
        }
    }
}
