// ABOUTME: Injectable sources of bid amounts for auction bidders.
// ABOUTME: Seeded ChaCha generators for reproducible runs, scripted amounts for tests.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Capability that picks how much a bidder offers.
pub trait BidSource: Send {
    /// Return an amount in `[0, ceiling)`. `ceiling` is always positive.
    ///
    /// Bidders clamp whatever is returned to their wallet, so an
    /// out-of-range answer can never overdraw one.
    fn next_amount(&mut self, ceiling: u64) -> u64;
}

/// Uniformly random bids drawn from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomBids<R> {
    rng: R,
}

impl<R: Rng + Send> RandomBids<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomBids<ChaCha8Rng> {
    /// Deterministic generator: the same seed yields the same amounts.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> BidSource for RandomBids<R> {
    fn next_amount(&mut self, ceiling: u64) -> u64 {
        self.rng.gen_range(0..ceiling)
    }
}

/// Bids taken from a fixed script, one per call. Returns 0 once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBids {
    amounts: VecDeque<u64>,
}

impl ScriptedBids {
    /// Create a source that answers with `amounts` in order.
    pub fn new(amounts: impl IntoIterator<Item = u64>) -> Self {
        Self {
            amounts: amounts.into_iter().collect(),
        }
    }
}

impl BidSource for ScriptedBids {
    fn next_amount(&mut self, _ceiling: u64) -> u64 {
        self.amounts.pop_front().unwrap_or(0)
    }
}
