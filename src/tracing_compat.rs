//! Optional tracing integration.
//!
//! With the `tracing-integration` feature enabled the queue emits
//! trace-level events on enqueue, dispatch, and cancel. When disabled the
//! macro compiles to nothing.

#[cfg(feature = "tracing-integration")]
macro_rules! queue_trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing-integration"))]
macro_rules! queue_trace {
    ($($arg:tt)*) => {{}};
}

pub(crate) use queue_trace;
