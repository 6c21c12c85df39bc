//! Deadline-ordered timer queue with token-based cancellation.
//!
//! # Overview
//!
//! A reactor-style event loop needs three things from its timer store: the
//! soonest pending deadline (to bound its blocking wait), a way to fire
//! everything that has come due, and a way to cancel pending timers by an
//! opaque token before they fire. [`TimerQueue`] provides exactly that
//! surface, backed by a binary min-heap over the deadlines cross-linked with
//! a hash index over the cancellation tokens, so that insert, fire, and
//! cancel all run in sub-linear time.
//!
//! # Core Guarantees
//!
//! - **Exactly-once termination**: every scheduled handler is consumed by
//!   exactly one of [`TimerHandler::fire`] or [`TimerHandler::cancel`]; both
//!   take the handler by value, so a second invocation is unrepresentable.
//! - **Dispatch order**: [`TimerQueue::dispatch_due`] fires strictly in
//!   non-decreasing deadline order, and never fires an entry whose deadline
//!   has not passed.
//! - **Earliest-changed signal**: [`TimerQueue::enqueue`] reports whether
//!   the new entry became the earliest pending deadline, so the owning loop
//!   only re-arms its wait timeout when that actually changed.
//!
//! # Module Structure
//!
//! - [`queue`]: the timer queue and the handler capability
//! - [`order`]: pluggable deadline orderings (natural, wraparound, closure)
//! - [`time`](mod@time): a nanosecond [`Time`] instant and clocks for
//!   production and for deterministic tests
//!
//! # Threading
//!
//! The queue is single-threaded by design: no locking, no I/O, no
//! suspension points. Callers that share a queue across threads must wrap
//! it in their own mutual exclusion.
//!
//! # Example
//!
//! ```
//! use deadline_queue::{BoxedHandler, TimerQueue, handler_fn};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut queue: TimerQueue<u64, &str, BoxedHandler> = TimerQueue::new();
//!
//! let fired = Rc::new(Cell::new(false));
//! let seen = fired.clone();
//! queue.enqueue(10, "io", Box::new(handler_fn(move || seen.set(true), || ())));
//!
//! assert_eq!(queue.earliest_deadline(), &10);
//! assert_eq!(queue.dispatch_due(&15), 1);
//! assert!(fired.get());
//! assert!(queue.is_empty());
//! ```

pub mod order;
pub mod queue;
pub mod time;

mod tracing_compat;

pub use order::{DeadlineOrder, NaturalOrder, OrderFn, WrappingOrder, order_fn};
pub use queue::{
    BoxedHandler, ErasedHandler, FnHandler, TimerHandler, TimerQueue, handler_fn,
};
pub use time::{Time, TimeSource, VirtualClock, WallClock};
