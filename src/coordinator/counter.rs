// ABOUTME: Exchange counter that records completed units under a mutex.
// ABOUTME: Reaching the configured limit raises the shared shutdown signal.

use tokio::sync::Mutex;

use super::shutdown::Shutdown;

/// What happened to a unit handed to [`ExchangeCounter::record_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The unit was counted; `count` is the new total.
    Recorded { count: u64 },
    /// The unit was counted and brought the total to the limit. Shutdown has
    /// been raised.
    LimitReached { count: u64 },
    /// The limit had already been reached; the unit was not counted.
    Rejected,
}

impl UnitOutcome {
    /// Returns true if the unit was counted.
    pub fn is_counted(&self) -> bool {
        !matches!(self, UnitOutcome::Rejected)
    }
}

/// Mutable state for the counter, protected by a single mutex.
struct CounterState {
    count: u64,
}

/// Counts completed units of work and gates the shutdown broadcast.
///
/// # Counting Semantics
///
/// - **Exclusive:** every increment happens under the mutex, so concurrent
///   producers never lose or duplicate an update.
/// - **Bounded:** the count never exceeds `limit`. Units recorded after the
///   limit are reported as [`UnitOutcome::Rejected`].
/// - **Single raise:** the call that brings the count to `limit` raises the
///   shutdown signal. No other code path in an exchange raises it.
pub struct ExchangeCounter {
    state: Mutex<CounterState>,
    limit: u64,
    shutdown: Shutdown,
}

impl ExchangeCounter {
    /// Create a new counter.
    ///
    /// # Arguments
    ///
    /// * `limit` - Number of units after which shutdown is raised.
    /// * `shutdown` - The signal to raise when the limit is reached.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn new(limit: u64, shutdown: Shutdown) -> Self {
        assert!(limit > 0, "limit must be positive");

        Self {
            state: Mutex::new(CounterState { count: 0 }),
            limit,
            shutdown,
        }
    }

    /// Record one completed unit.
    pub async fn record_unit(&self) -> UnitOutcome {
        let mut state = self.state.lock().await;

        if state.count >= self.limit {
            return UnitOutcome::Rejected;
        }

        state.count += 1;
        if state.count == self.limit {
            self.shutdown.raise();
            return UnitOutcome::LimitReached { count: state.count };
        }

        UnitOutcome::Recorded { count: state.count }
    }

    /// Current number of recorded units.
    pub async fn count(&self) -> u64 {
        self.state.lock().await.count
    }

    /// The configured limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The signal this counter raises.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }
}
