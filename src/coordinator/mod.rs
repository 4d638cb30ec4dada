// ABOUTME: Coordination primitives shared by every exchange variant.
// ABOUTME: Contains the shutdown broadcast, the unit counter, and the work channel.

mod channel;
mod counter;
mod shutdown;

pub use channel::WorkChannel;
pub use counter::{ExchangeCounter, UnitOutcome};
pub use shutdown::Shutdown;

#[cfg(test)]
mod counter_test;
