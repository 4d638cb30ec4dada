// ABOUTME: Barista - the producer role of the exchange.
// ABOUTME: Accepts offers until shutdown, recording each finished unit on the counter.

use async_trait::async_trait;

use super::{ExchangeContext, Order, Receipt};
use crate::coordinator::UnitOutcome;
use crate::error::ParticipantError;
use crate::event::Event;
use crate::participant::{Participant, ParticipantState, Role};

/// Producer that completes work offers.
///
/// While idle the barista waits on both the offer channel and the shutdown
/// broadcast with no preference between them. Once an order is accepted it is
/// always finished: recorded on the counter, or rejected if the limit was
/// reached in the meantime.
pub struct Barista {
    name: String,
    context: ExchangeContext,
    state: ParticipantState,
    completed: u64,
    rejected: u64,
}

impl Barista {
    pub(crate) fn new(name: String, context: ExchangeContext) -> Self {
        Self {
            name,
            context,
            state: ParticipantState::Idle,
            completed: 0,
            rejected: 0,
        }
    }

    /// Orders finished after the limit and therefore not counted.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    async fn serve(&mut self, order: Order) {
        self.state = ParticipantState::Working;
        self.context.sink.emit(Event::WorkAccepted {
            producer: self.name.clone(),
            consumer: order.customer.clone(),
        });

        if !self.context.work_time.is_zero() {
            tokio::time::sleep(self.context.work_time).await;
        }

        let outcome = self.context.counter.record_unit().await;
        let count = match outcome {
            UnitOutcome::Recorded { count } | UnitOutcome::LimitReached { count } => count,
            UnitOutcome::Rejected => {
                self.rejected += 1;
                self.context.sink.emit(Event::WorkRejected {
                    producer: self.name.clone(),
                    consumer: order.customer,
                });
                // Dropping the reply slot tells the customer nothing is coming
                return;
            }
        };

        self.completed += 1;
        self.context.sink.emit(Event::WorkCompleted {
            producer: self.name.clone(),
            consumer: order.customer.clone(),
            count,
        });
        if matches!(outcome, UnitOutcome::LimitReached { .. }) {
            self.context.sink.emit(Event::ShutdownRaised { count });
        }

        let receipt = Receipt {
            producer: self.name.clone(),
            count,
        };
        if order.reply.send(receipt).is_err() {
            tracing::debug!(
                producer = %self.name,
                customer = %order.customer,
                "customer left before receiving its order"
            );
        }
    }
}

#[async_trait]
impl Participant for Barista {
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
        self.completed
    }

    async fn run(&mut self) -> Result<(), ParticipantError> {
        loop {
            self.state = ParticipantState::Idle;
            let Some(order) = self.context.offers.take(&self.context.shutdown).await else {
                break;
            };
            self.serve(order).await;
        }

        self.state = ParticipantState::Stopped;
        self.context.sink.emit(Event::Stopped {
            name: self.name.clone(),
            role: Role::Producer,
        });
        Ok(())
    }
}
