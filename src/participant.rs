// ABOUTME: The Participant trait shared by producers, consumers, bidders, and auctioneers.
// ABOUTME: Provides role/state types plus helpers to spawn and join participant tasks.

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::ParticipantError;

/// The role a participant plays in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Accepts work offers and completes them (barista).
    Producer,
    /// Places work offers and waits for results (customer).
    Consumer,
    /// Submits one bid per round (auction).
    Bidder,
    /// Drives auction rounds and charges winners.
    Auctioneer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Producer => write!(f, "producer"),
            Role::Consumer => write!(f, "consumer"),
            Role::Bidder => write!(f, "bidder"),
            Role::Auctioneer => write!(f, "auctioneer"),
        }
    }
}

/// Lifecycle state of a participant.
///
/// `Idle -> Working -> Idle` repeats once per unit of work. `Stopped` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantState {
    Idle,
    Working,
    Stopped,
}

impl std::fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantState::Idle => write!(f, "idle"),
            ParticipantState::Working => write!(f, "working"),
            ParticipantState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Snapshot of a participant after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub name: String,
    pub role: Role,
    pub state: ParticipantState,
    /// Units this participant finished: orders completed, orders received,
    /// bids placed, or rounds closed depending on role.
    pub units: u64,
}

/// An independent actor that runs as its own task.
///
/// Every participant owns its private state. Anything another participant
/// needs from it travels over a channel.
#[async_trait]
pub trait Participant: Send {
    /// Unique name within a run.
    fn name(&self) -> &str;

    /// The role this participant plays.
    fn role(&self) -> Role;

    /// Current lifecycle state.
    fn state(&self) -> ParticipantState;

    /// Units finished so far.
    fn units(&self) -> u64;

    /// Run until the participant reaches `Stopped`.
    async fn run(&mut self) -> Result<(), ParticipantError>;

    /// Snapshot of the participant.
    fn summary(&self) -> ParticipantSummary {
        ParticipantSummary {
            name: self.name().to_string(),
            role: self.role(),
            state: self.state(),
            units: self.units(),
        }
    }
}

/// A spawned participant task, tagged with the participant's name.
pub(crate) struct Running<P> {
    name: String,
    handle: JoinHandle<(P, Result<(), ParticipantError>)>,
}

/// Spawn a participant onto the runtime. The task hands the participant back
/// when it finishes so its final state can be inspected.
pub(crate) fn spawn<P>(mut participant: P) -> Running<P>
where
    P: Participant + 'static,
{
    let name = participant.name().to_string();
    let handle = tokio::spawn(async move {
        let result = participant.run().await;
        (participant, result)
    });
    Running { name, handle }
}

/// Wait for every spawned participant, in spawn order.
///
/// All tasks are awaited before any error is reported, so no task is left
/// running when this returns.
pub(crate) async fn join_all<P>(running: Vec<Running<P>>) -> Result<Vec<P>, ParticipantError>
where
    P: Participant + 'static,
{
    let results = futures::future::join_all(
        running
            .into_iter()
            .map(|r| async move { (r.name, r.handle.await) }),
    )
    .await;

    let mut participants = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (name, joined) in results {
        match joined {
            Ok((participant, Ok(()))) => participants.push(participant),
            Ok((_, Err(e))) => {
                tracing::warn!(participant = %name, error = %e, "participant failed");
                first_error.get_or_insert(e);
            }
            Err(source) => {
                tracing::warn!(participant = %name, "participant task did not complete");
                first_error.get_or_insert(ParticipantError::Join { name, source });
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(participants),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        name: String,
        target: u64,
        done: u64,
        state: ParticipantState,
    }

    #[async_trait]
    impl Participant for Counter {
        fn name(&self) -> &str {
            &self.name
        }

        fn role(&self) -> Role {
            Role::Producer
        }

        fn state(&self) -> ParticipantState {
            self.state
        }

        fn units(&self) -> u64 {
            self.done
        }

        async fn run(&mut self) -> Result<(), ParticipantError> {
            while self.done < self.target {
                self.done += 1;
                tokio::task::yield_now().await;
            }
            self.state = ParticipantState::Stopped;
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Participant for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn role(&self) -> Role {
            Role::Bidder
        }

        fn state(&self) -> ParticipantState {
            ParticipantState::Idle
        }

        fn units(&self) -> u64 {
            0
        }

        async fn run(&mut self) -> Result<(), ParticipantError> {
            Err(ParticipantError::BidsClosed("trophy".to_string()))
        }
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Producer.to_string(), "producer");
        assert_eq!(Role::Consumer.to_string(), "consumer");
        assert_eq!(Role::Bidder.to_string(), "bidder");
        assert_eq!(Role::Auctioneer.to_string(), "auctioneer");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ParticipantState::Idle.to_string(), "idle");
        assert_eq!(ParticipantState::Working.to_string(), "working");
        assert_eq!(ParticipantState::Stopped.to_string(), "stopped");
    }

    #[tokio::test]
    async fn test_spawn_and_join_returns_participants_in_order() {
        let running = (0..4)
            .map(|i| {
                spawn(Counter {
                    name: format!("counter-{}", i),
                    target: i,
                    done: 0,
                    state: ParticipantState::Idle,
                })
            })
            .collect();

        let finished = join_all(running).await.unwrap();
        assert_eq!(finished.len(), 4);
        for (i, p) in finished.iter().enumerate() {
            let summary = p.summary();
            assert_eq!(summary.name, format!("counter-{}", i));
            assert_eq!(summary.units, i as u64);
            assert_eq!(summary.state, ParticipantState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_join_reports_run_error() {
        let result = join_all(vec![spawn(Failing)]).await;
        assert!(matches!(result, Err(ParticipantError::BidsClosed(_))));
    }
}
