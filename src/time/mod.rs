//! Concrete time representation and clocks.
//!
//! The queue itself is generic over its deadline type; this module supplies
//! the stock instantiation. [`Time`] is a nanosecond instant, and
//! [`TimeSource`] abstracts where "now" comes from: [`WallClock`] for
//! production event loops, [`VirtualClock`] for deterministic tests that
//! advance time by hand.

mod clock;
mod instant;

pub use clock::{TimeSource, VirtualClock, WallClock};
pub use instant::Time;
