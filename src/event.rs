// ABOUTME: Progress events emitted on every participant state transition.
// ABOUTME: Sinks route them to tracing or collect them in memory.

use std::sync::{Arc, Mutex, PoisonError};

use crate::participant::Role;

/// A single state transition observed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A consumer placed a work offer.
    WorkOffered { consumer: String },
    /// A producer accepted a consumer's offer.
    WorkAccepted { producer: String, consumer: String },
    /// A producer completed and recorded a unit.
    WorkCompleted {
        producer: String,
        consumer: String,
        count: u64,
    },
    /// A producer finished a unit after the limit was reached; it was not counted.
    WorkRejected { producer: String, consumer: String },
    /// A consumer received the result of its own offer.
    WorkReceived { consumer: String, producer: String },
    /// The counter reached its limit and the shutdown broadcast went out.
    ShutdownRaised { count: u64 },
    /// The auctioneer opened bidding on an item.
    RoundOpened { round: usize, item: String },
    /// A bidder submitted its bid for the current round.
    BidPlaced {
        bidder: String,
        item: String,
        amount: u64,
    },
    /// The auctioneer sold an item and charged the winner.
    RoundWon {
        item: String,
        bidder: String,
        amount: u64,
    },
    /// A participant reached its terminal state.
    Stopped { name: String, role: Role },
}

impl Event {
    /// Short machine-friendly name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::WorkOffered { .. } => "work_offered",
            Event::WorkAccepted { .. } => "work_accepted",
            Event::WorkCompleted { .. } => "work_completed",
            Event::WorkRejected { .. } => "work_rejected",
            Event::WorkReceived { .. } => "work_received",
            Event::ShutdownRaised { .. } => "shutdown_raised",
            Event::RoundOpened { .. } => "round_opened",
            Event::BidPlaced { .. } => "bid_placed",
            Event::RoundWon { .. } => "round_won",
            Event::Stopped { .. } => "stopped",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::WorkOffered { consumer } => write!(f, "{} places an order", consumer),
            Event::WorkAccepted { producer, consumer } => {
                write!(f, "{} takes the order from {}", producer, consumer)
            }
            Event::WorkCompleted {
                producer,
                consumer,
                count,
            } => write!(
                f,
                "{} completes the order for {} (#{})",
                producer, consumer, count
            ),
            Event::WorkRejected { producer, consumer } => write!(
                f,
                "{} drops the order from {}: limit reached",
                producer, consumer
            ),
            Event::WorkReceived { consumer, producer } => {
                write!(f, "{} receives the order from {}", consumer, producer)
            }
            Event::ShutdownRaised { count } => {
                write!(f, "limit reached after {} units, shutting down", count)
            }
            Event::RoundOpened { round, item } => {
                write!(f, "round {} opens bids for {}", round + 1, item)
            }
            Event::BidPlaced {
                bidder,
                item,
                amount,
            } => write!(f, "{} bids {} for {}", bidder, amount, item),
            Event::RoundWon {
                item,
                bidder,
                amount,
            } => write!(f, "{} is sold to {} for {}", item, bidder, amount),
            Event::Stopped { name, role } => write!(f, "{} ({}) stops", name, role),
        }
    }
}

/// Destination for progress events.
///
/// Implementations must be cheap and non-blocking: events are emitted from
/// inside participant loops.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: Event);
}

/// Sink that writes each event as one `tracing` info line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink wrapped in Arc for sharing.
    pub fn shared() -> Arc<dyn EventSink> {
        Arc::new(Self)
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        tracing::info!(kind = event.kind(), "{}", event);
    }
}

/// In-memory event sink.
///
/// Keeps every event in emission order. Useful for tests and for rendering a
/// deterministic transcript after a run.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new sink wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events of the given kind.
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let event = Event::RoundWon {
            item: "trophy".to_string(),
            bidder: "bidder-3".to_string(),
            amount: 120,
        };
        assert_eq!(event.to_string(), "trophy is sold to bidder-3 for 120");

        let event = Event::RoundOpened {
            round: 0,
            item: "trophy".to_string(),
        };
        assert_eq!(event.to_string(), "round 1 opens bids for trophy");

        let event = Event::Stopped {
            name: "barista-0".to_string(),
            role: Role::Producer,
        };
        assert_eq!(event.to_string(), "barista-0 (producer) stops");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(Event::WorkOffered {
            consumer: "a".to_string(),
        });
        sink.emit(Event::ShutdownRaised { count: 1 });
        sink.emit(Event::WorkOffered {
            consumer: "b".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].kind(), "shutdown_raised");
        assert_eq!(sink.count("work_offered"), 2);
        assert_eq!(sink.count("round_won"), 0);
    }

    #[test]
    fn test_tracing_sink_accepts_events() {
        // No subscriber installed; emitting must still be harmless
        let sink = TracingSink::shared();
        sink.emit(Event::ShutdownRaised { count: 4 });
    }
}
