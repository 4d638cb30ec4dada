// ABOUTME: Fan-out helpers - run N copies of a task, or several ordered step sequences, concurrently.
// ABOUTME: Every spawned task is joined before returning, so nothing outlives the call.

use std::future::Future;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::error::ParticipantError;

/// Spawn `factor` concurrent copies of `task` and wait for all of them.
///
/// Each copy receives its index. Results come back in index order no matter
/// which copy finished first. A factor of zero spawns nothing.
pub async fn fan_out<T, F, Fut>(factor: usize, task: F) -> Result<Vec<T>, ParticipantError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<JoinHandle<T>> = (0..factor).map(|i| tokio::spawn(task(i))).collect();
    tracing::debug!(factor, "fanned out");
    join_named(handles, |i| format!("fanout-{}", i)).await
}

/// One step of a [`Sequence`]. Steps do nothing until the sequence awaits them.
pub type Step = BoxFuture<'static, ()>;

/// A named list of steps that must run one after another.
pub struct Sequence {
    name: String,
    steps: Vec<Step>,
}

impl Sequence {
    /// Create an empty sequence.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.steps.push(Box::pin(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    async fn run(self) -> SequenceReport {
        let total = self.steps.len();
        for (i, step) in self.steps.into_iter().enumerate() {
            tracing::debug!(sequence = %self.name, step = i + 1, total, "step starting");
            step.await;
        }
        tracing::info!(sequence = %self.name, steps = total, "sequence finished");
        SequenceReport {
            name: self.name,
            steps: total,
        }
    }
}

/// What a finished sequence reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub name: String,
    pub steps: usize,
}

/// Run every sequence concurrently, each on its own task, and wait for all.
///
/// Steps within a sequence never overlap; steps of different sequences may
/// interleave freely. Reports come back in the order the sequences were given.
pub async fn run_sequences(
    sequences: Vec<Sequence>,
) -> Result<Vec<SequenceReport>, ParticipantError> {
    let names: Vec<String> = sequences.iter().map(|s| s.name.clone()).collect();
    let handles: Vec<JoinHandle<SequenceReport>> = sequences
        .into_iter()
        .map(|s| tokio::spawn(s.run()))
        .collect();
    join_named(handles, |i| names[i].clone()).await
}

/// Await every handle, then report the first task that failed to complete.
async fn join_named<T>(
    handles: Vec<JoinHandle<T>>,
    name: impl Fn(usize) -> String,
) -> Result<Vec<T>, ParticipantError> {
    let joined = futures::future::join_all(handles).await;

    let mut results = Vec::with_capacity(joined.len());
    let mut first_error = None;
    for (i, outcome) in joined.into_iter().enumerate() {
        match outcome {
            Ok(value) => results.push(value),
            Err(source) => {
                let name = name(i);
                tracing::warn!(task = %name, "fan-out task did not complete");
                first_error.get_or_insert(ParticipantError::Join { name, source });
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(results),
    }
}
