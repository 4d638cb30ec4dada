// ABOUTME: Auctioneer - the coordinator role of the auction.
// ABOUTME: Opens each round for every bidder, collects all bids, and charges the winner.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::bidder::BidderCommand;
use super::{Bid, Sale};
use crate::error::ParticipantError;
use crate::event::{Event, EventSink};
use crate::participant::{Participant, ParticipantState, Role};

/// The auctioneer's handle on one bidder.
pub(crate) struct Seat {
    pub(crate) bidder: String,
    pub(crate) commands: mpsc::Sender<BidderCommand>,
}

/// Pick the winning bid.
///
/// Bids are examined in arrival order and a bid only takes the lead when it
/// is strictly greater than the current best, so among equal top bids the
/// first one observed wins. Returns `None` only for an empty slice.
pub fn select_winner(bids: &[Bid]) -> Option<&Bid> {
    let mut winner: Option<&Bid> = None;
    for bid in bids {
        match winner {
            Some(best) if bid.amount <= best.amount => {}
            _ => winner = Some(bid),
        }
    }
    winner
}

/// Resolves with the id of the first bidder whose task has dropped its
/// command receiver. Never resolves while every bidder is alive.
async fn first_departure(seats: &[Seat]) -> String {
    if seats.is_empty() {
        return std::future::pending().await;
    }
    let closed = seats.iter().map(|seat| {
        Box::pin(async move {
            seat.commands.closed().await;
            seat.bidder.clone()
        })
    });
    let (bidder, _, _) = futures::future::select_all(closed).await;
    bidder
}

/// Coordinator that drives strictly sequential rounds.
///
/// For each item the auctioneer admits every bidder once, waits for all of
/// their bids, charges the winner, and only then moves on. When the last
/// item is sold it drops its command senders, which lets every bidder stop.
pub struct Auctioneer {
    items: Vec<String>,
    seats: Vec<Seat>,
    bids: mpsc::Receiver<Bid>,
    sink: Arc<dyn EventSink>,
    state: ParticipantState,
    sales: Vec<Sale>,
}

impl Auctioneer {
    pub(crate) fn new(
        items: Vec<String>,
        seats: Vec<Seat>,
        bids: mpsc::Receiver<Bid>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            items,
            seats,
            bids,
            sink,
            state: ParticipantState::Idle,
            sales: Vec::new(),
        }
    }

    /// Take ownership of the completed sales.
    pub fn into_sales(self) -> Vec<Sale> {
        self.sales
    }

    async fn run_rounds(&mut self) -> Result<(), ParticipantError> {
        let items = self.items.clone();
        for (round, item) in items.into_iter().enumerate() {
            self.state = ParticipantState::Working;
            self.sink.emit(Event::RoundOpened {
                round,
                item: item.clone(),
            });

            self.open_round(&item).await?;
            let bids = self.collect_bids(&item).await?;
            let Some(winner) = select_winner(&bids).cloned() else {
                return Err(ParticipantError::BidsClosed(item));
            };
            let remaining = self.charge(&item, &winner).await?;

            self.sink.emit(Event::RoundWon {
                item: item.clone(),
                bidder: winner.bidder.clone(),
                amount: winner.amount,
            });
            self.sales.push(Sale {
                round,
                item,
                winner: winner.bidder,
                amount: winner.amount,
                remaining_wallet: remaining,
                bids,
            });
            self.state = ParticipantState::Idle;
        }
        Ok(())
    }

    /// Admit every bidder to the round, one admission each.
    async fn open_round(&self, item: &str) -> Result<(), ParticipantError> {
        for seat in &self.seats {
            let command = BidderCommand::Open {
                item: item.to_string(),
            };
            seat.commands
                .send(command)
                .await
                .map_err(|_| ParticipantError::BidderGone(seat.bidder.clone()))?;
        }
        Ok(())
    }

    /// Wait until every admitted bidder has bid.
    ///
    /// Surviving bidders keep the bid channel open, so a bidder whose task
    /// died is detected through its command channel instead.
    async fn collect_bids(&mut self, item: &str) -> Result<Vec<Bid>, ParticipantError> {
        let mut bids = Vec::with_capacity(self.seats.len());
        while bids.len() < self.seats.len() {
            tokio::select! {
                bid = self.bids.recv() => {
                    let bid = bid.ok_or_else(|| ParticipantError::BidsClosed(item.to_string()))?;
                    bids.push(bid);
                }
                gone = first_departure(&self.seats) => {
                    tracing::warn!(bidder = %gone, item, "bidder left mid-round");
                    return Err(ParticipantError::BidderGone(gone));
                }
            }
        }
        Ok(bids)
    }

    /// Ask the winner to pay and wait until it has.
    async fn charge(&self, item: &str, winner: &Bid) -> Result<u64, ParticipantError> {
        let gone = || ParticipantError::BidderGone(winner.bidder.clone());
        let seat = self
            .seats
            .iter()
            .find(|s| s.bidder == winner.bidder)
            .ok_or_else(gone)?;

        let (ack, paid) = oneshot::channel();
        let command = BidderCommand::Charge {
            item: item.to_string(),
            amount: winner.amount,
            ack,
        };
        seat.commands.send(command).await.map_err(|_| gone())?;
        paid.await.map_err(|_| gone())
    }
}

#[async_trait]
impl Participant for Auctioneer {
    fn name(&self) -> &str {
        "auctioneer"
    }

    fn role(&self) -> Role {
        Role::Auctioneer
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn units(&self) -> u64 {
        self.sales.len() as u64
    }

    async fn run(&mut self) -> Result<(), ParticipantError> {
        let result = self.run_rounds().await;

        // Closing every command channel is the bidders' signal to stop,
        // whether or not all rounds completed
        self.seats.clear();
        self.state = ParticipantState::Stopped;
        self.sink.emit(Event::Stopped {
            name: "auctioneer".to_string(),
            role: Role::Auctioneer,
        });
        result
    }
}
