// ABOUTME: Customer - the consumer role of the exchange.
// ABOUTME: Places offers and waits for its own result or the shutdown broadcast.

use async_trait::async_trait;

use super::{ExchangeContext, Order};
use crate::error::ParticipantError;
use crate::event::Event;
use crate::participant::{Participant, ParticipantState, Role};

/// Consumer that repeatedly orders work.
///
/// Each order is offered on the shared channel; the customer then waits for
/// either the result of that order or shutdown. An order left unanswered at
/// shutdown is simply abandoned; the counter alone decides what was completed.
pub struct Customer {
    name: String,
    context: ExchangeContext,
    state: ParticipantState,
    offered: u64,
    received: u64,
}

impl Customer {
    pub(crate) fn new(name: String, context: ExchangeContext) -> Self {
        Self {
            name,
            context,
            state: ParticipantState::Idle,
            offered: 0,
            received: 0,
        }
    }

    /// Orders this customer placed.
    pub fn offered(&self) -> u64 {
        self.offered
    }

    /// Returns true if the customer should keep ordering.
    async fn order_once(&mut self) -> bool {
        let (order, receipt) = Order::new(self.name.clone());
        if self
            .context
            .offers
            .put(order, &self.context.shutdown)
            .await
            .is_err()
        {
            return false;
        }

        self.state = ParticipantState::Working;
        self.offered += 1;
        self.context.sink.emit(Event::WorkOffered {
            consumer: self.name.clone(),
        });

        tokio::select! {
            receipt = receipt => match receipt {
                Ok(receipt) => {
                    self.received += 1;
                    self.context.sink.emit(Event::WorkReceived {
                        consumer: self.name.clone(),
                        producer: receipt.producer,
                    });
                    true
                }
                // The producer dropped the order: the limit was reached
                Err(_) => false,
            },
            () = self.context.shutdown.wait() => false,
        }
    }
}

#[async_trait]
impl Participant for Customer {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> Role {
        Role::Consumer
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn units(&self) -> u64 {
        self.received
    }

    async fn run(&mut self) -> Result<(), ParticipantError> {
        loop {
            self.state = ParticipantState::Idle;
            if !self.order_once().await {
                break;
            }
        }

        self.state = ParticipantState::Stopped;
        self.context.sink.emit(Event::Stopped {
            name: self.name.clone(),
            role: Role::Consumer,
        });
        Ok(())
    }
}
