// ABOUTME: Producer/consumer exchange - baristas serve customers until a limit is hit.
// ABOUTME: Wires the offer channel, counter, and shutdown broadcast, then joins every task.

mod barista;
mod customer;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::config::ExchangeConfig;
use crate::coordinator::{ExchangeCounter, Shutdown, WorkChannel};
use crate::error::{ConfigError, RendezvousError};
use crate::event::{EventSink, TracingSink};
use crate::participant::{self, Participant, ParticipantSummary};

pub use barista::Barista;
pub use customer::Customer;


/// A work offer placed by a consumer.
///
/// The offer carries its own reply slot so the result goes back to the
/// consumer that placed it.
#[derive(Debug)]
pub struct Order {
    customer: String,
    reply: oneshot::Sender<Receipt>,
}

impl Order {
    /// Create an order and the receiver its result will arrive on.
    pub fn new(customer: impl Into<String>) -> (Self, oneshot::Receiver<Receipt>) {
        let (reply, receipt) = oneshot::channel();
        let order = Self {
            customer: customer.into(),
            reply,
        };
        (order, receipt)
    }

    /// Name of the consumer that placed the order.
    pub fn customer(&self) -> &str {
        &self.customer
    }
}

/// Completion notice sent back to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Producer that completed the order.
    pub producer: String,
    /// Counter value after this order was recorded.
    pub count: u64,
}

/// Everything the participants of one exchange share.
#[derive(Clone)]
pub(crate) struct ExchangeContext {
    pub(crate) offers: WorkChannel<Order>,
    pub(crate) counter: Arc<ExchangeCounter>,
    pub(crate) shutdown: Shutdown,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) work_time: Duration,
}

/// Outcome of an exchange run.
#[derive(Debug, Clone)]
pub struct ExchangeReport {
    /// Units recorded by the counter. Equals the limit after a normal run.
    pub completions: u64,
    /// The configured limit.
    pub limit: u64,
    /// Whether the shutdown broadcast went out.
    pub shutdown_raised: bool,
    /// Final state of every producer, in spawn order.
    pub producers: Vec<ParticipantSummary>,
    /// Final state of every consumer, in spawn order.
    pub consumers: Vec<ParticipantSummary>,
    /// Orders producers finished after the limit and did not count.
    pub rejected: u64,
}

impl ExchangeReport {
    /// Total units completed as seen by producers.
    pub fn produced(&self) -> u64 {
        self.producers.iter().map(|p| p.units).sum()
    }

    /// Total results received as seen by consumers.
    pub fn received(&self) -> u64 {
        self.consumers.iter().map(|c| c.units).sum()
    }
}

/// A bounded producer/consumer exchange.
///
/// Producers and consumers run as independent tasks. Any producer may serve
/// any consumer. Each completed unit is recorded on a shared counter; when
/// the counter reaches the limit it raises the shutdown broadcast and every
/// task stops.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), rendezvous::RendezvousError> {
/// use rendezvous::config::ExchangeConfig;
/// use rendezvous::exchange::Exchange;
///
/// let config = ExchangeConfig { producers: 2, consumers: 3, limit: 4, work_time_ms: 0 };
/// let report = Exchange::new(config)?.run().await?;
/// assert_eq!(report.completions, 4);
/// # Ok(())
/// # }
/// ```
pub struct Exchange {
    config: ExchangeConfig,
    sink: Arc<dyn EventSink>,
}

impl Exchange {
    /// Create an exchange. Fails if the configuration cannot make progress.
    pub fn new(config: ExchangeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            sink: TracingSink::shared(),
        })
    }

    /// Route progress events to `sink` instead of tracing.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The configuration this exchange runs with.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Run until the limit is reached and every task has stopped.
    pub async fn run(&self) -> Result<ExchangeReport, RendezvousError> {
        let shutdown = Shutdown::new();
        let counter = Arc::new(ExchangeCounter::new(self.config.limit, shutdown.clone()));
        let context = ExchangeContext {
            offers: WorkChannel::bounded(self.config.producers),
            counter: counter.clone(),
            shutdown: shutdown.clone(),
            sink: self.sink.clone(),
            work_time: self.config.work_time(),
        };

        tracing::info!(
            producers = self.config.producers,
            consumers = self.config.consumers,
            limit = self.config.limit,
            "exchange opening"
        );

        let baristas: Vec<_> = (0..self.config.producers)
            .map(|i| participant::spawn(Barista::new(format!("barista-{}", i), context.clone())))
            .collect();
        let customers: Vec<_> = (0..self.config.consumers)
            .map(|i| participant::spawn(Customer::new(format!("customer-{}", i), context.clone())))
            .collect();
        drop(context);

        let baristas = participant::join_all(baristas).await?;
        let customers = participant::join_all(customers).await?;

        let report = ExchangeReport {
            completions: counter.count().await,
            limit: counter.limit(),
            shutdown_raised: shutdown.is_raised(),
            rejected: baristas.iter().map(Barista::rejected).sum(),
            producers: baristas.iter().map(|b| b.summary()).collect(),
            consumers: customers.iter().map(|c| c.summary()).collect(),
        };

        tracing::info!(
            completions = report.completions,
            rejected = report.rejected,
            "exchange closed"
        );

        Ok(report)
    }
}
