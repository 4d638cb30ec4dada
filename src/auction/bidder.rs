// ABOUTME: Bidder - the producer role of the auction.
// ABOUTME: Owns a private wallet, bids once per admission, and pays when told it won.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::Bid;
use super::bid_source::BidSource;
use crate::error::ParticipantError;
use crate::event::{Event, EventSink};
use crate::participant::{Participant, ParticipantState, Role};

/// Instructions the auctioneer sends to a single bidder.
pub(crate) enum BidderCommand {
    /// Bidding is open for `item`: submit exactly one bid.
    Open { item: String },
    /// The bidder won `item` and must pay `amount`. The remaining wallet is
    /// sent back on `ack` once paid.
    Charge {
        item: String,
        amount: u64,
        ack: oneshot::Sender<u64>,
    },
}

/// A bidder and its private wallet.
///
/// Only the bidder's own task ever touches the wallet. Winning a round is
/// settled by a [`BidderCommand::Charge`] that the bidder applies itself,
/// so the wallet has exactly one writer.
pub struct Bidder {
    id: String,
    wallet: u64,
    starting_wallet: u64,
    source: Box<dyn BidSource>,
    commands: mpsc::Receiver<BidderCommand>,
    bids: mpsc::Sender<Bid>,
    sink: Arc<dyn EventSink>,
    state: ParticipantState,
    bids_placed: u64,
    wins: u64,
}

impl Bidder {
    pub(crate) fn new(
        id: String,
        wallet: u64,
        source: Box<dyn BidSource>,
        commands: mpsc::Receiver<BidderCommand>,
        bids: mpsc::Sender<Bid>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            wallet,
            starting_wallet: wallet,
            source,
            commands,
            bids,
            sink,
            state: ParticipantState::Idle,
            bids_placed: 0,
            wins: 0,
        }
    }

    /// Current wallet balance.
    pub fn wallet(&self) -> u64 {
        self.wallet
    }

    /// Wallet balance before the first round.
    pub fn starting_wallet(&self) -> u64 {
        self.starting_wallet
    }

    /// Number of rounds won.
    pub fn wins(&self) -> u64 {
        self.wins
    }

    /// Amount to bid this round, never above the wallet.
    fn quote(&mut self) -> u64 {
        if self.wallet == 0 {
            return 0;
        }
        self.source.next_amount(self.wallet).min(self.wallet)
    }

    async fn place_bid(&mut self, item: String) -> Result<(), ParticipantError> {
        self.state = ParticipantState::Working;
        let amount = self.quote();
        self.bids_placed += 1;
        self.sink.emit(Event::BidPlaced {
            bidder: self.id.clone(),
            item: item.clone(),
            amount,
        });

        let bid = Bid {
            bidder: self.id.clone(),
            amount,
        };
        self.bids
            .send(bid)
            .await
            .map_err(|_| ParticipantError::BidsClosed(item))?;
        self.state = ParticipantState::Idle;
        Ok(())
    }

    fn pay(&mut self, item: &str, amount: u64, ack: oneshot::Sender<u64>) {
        debug_assert!(amount <= self.wallet, "charged above wallet");
        self.wallet = self.wallet.saturating_sub(amount);
        self.wins += 1;
        tracing::debug!(bidder = %self.id, item, amount, wallet = self.wallet, "paid for item");

        if ack.send(self.wallet).is_err() {
            tracing::warn!(bidder = %self.id, item, "auctioneer left before charge was acknowledged");
        }
    }
}

#[async_trait]
impl Participant for Bidder {
    fn name(&self) -> &str {
        &self.id
    }

    fn role(&self) -> Role {
        Role::Bidder
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn units(&self) -> u64 {
        self.bids_placed
    }

    async fn run(&mut self) -> Result<(), ParticipantError> {
        // The auctioneer closes the command channel after the last round
        while let Some(command) = self.commands.recv().await {
            match command {
                BidderCommand::Open { item } => self.place_bid(item).await?,
                BidderCommand::Charge { item, amount, ack } => self.pay(&item, amount, ack),
            }
        }

        self.state = ParticipantState::Stopped;
        self.sink.emit(Event::Stopped {
            name: self.id.clone(),
            role: Role::Bidder,
        });
        Ok(())
    }
}
