// ABOUTME: Round-based auction - an auctioneer sells items to competing bidders.
// ABOUTME: Builds per-bidder admission channels and a shared bid channel, then runs every round.

mod auctioneer;
mod bid_source;
mod bidder;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AuctionConfig;
use crate::error::{ConfigError, RendezvousError};
use crate::event::{EventSink, TracingSink};
use crate::participant::{self, Participant, ParticipantSummary};

pub use auctioneer::{Auctioneer, select_winner};
pub use bid_source::{BidSource, RandomBids, ScriptedBids};
pub use bidder::Bidder;

use auctioneer::Seat;
use bidder::BidderCommand;

#[cfg(test)]
mod auction_test;

/// A bid submitted by one bidder for the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    pub bidder: String,
    pub amount: u64,
}

/// The result of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    /// Zero-based round number.
    pub round: usize,
    pub item: String,
    pub winner: String,
    pub amount: u64,
    /// Winner's wallet after paying.
    pub remaining_wallet: u64,
    /// Every bid of the round, in the order the auctioneer received them.
    pub bids: Vec<Bid>,
}

/// Final state of one bidder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderOutcome {
    pub summary: ParticipantSummary,
    pub starting_wallet: u64,
    pub wallet: u64,
    pub wins: u64,
}

impl BidderOutcome {
    /// Total paid across all won rounds.
    pub fn spent(&self) -> u64 {
        self.starting_wallet - self.wallet
    }
}

/// Outcome of an auction run.
#[derive(Debug, Clone)]
pub struct AuctionReport {
    /// Seed the default bid sources were derived from.
    pub seed: u64,
    /// One sale per item, in round order.
    pub sales: Vec<Sale>,
    /// Every bidder, in seat order.
    pub bidders: Vec<BidderOutcome>,
    pub auctioneer: ParticipantSummary,
}

impl AuctionReport {
    /// Look up a bidder's outcome by id.
    pub fn bidder(&self, id: &str) -> Option<&BidderOutcome> {
        self.bidders.iter().find(|b| b.summary.name == id)
    }
}

/// Builds the bid source for the bidder in a given seat.
pub type SourceFactory = Box<dyn Fn(usize, u64) -> Box<dyn BidSource> + Send + Sync>;

/// A round-based auction over a fixed list of items.
///
/// Rounds are strictly sequential. In each one every bidder is admitted
/// exactly once, all bids are collected, the first-observed strictly-greatest
/// bid wins, and the winner pays before the next round opens. The auction
/// ends after the last item; no shutdown broadcast is involved because the
/// number of rounds is fixed.
pub struct Auction {
    config: AuctionConfig,
    seed: u64,
    sources: SourceFactory,
    sink: Arc<dyn EventSink>,
}

impl Auction {
    /// Create an auction. Fails if the configuration cannot complete a round.
    ///
    /// Each bidder gets a ChaCha8 generator seeded from the configured seed
    /// plus its seat index. Without a configured seed one is drawn at random
    /// and logged so the run can be replayed.
    pub fn new(config: AuctionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                tracing::info!(seed, "no auction seed configured, drew one");
                seed
            }
        };

        Ok(Self {
            config,
            seed,
            sources: Box::new(|seat: usize, seed: u64| -> Box<dyn BidSource> {
                Box::new(RandomBids::seeded(seed.wrapping_add(seat as u64)))
            }),
            sink: TracingSink::shared(),
        })
    }

    /// Replace the default bid sources. `factory` receives the seat index and
    /// the auction seed.
    pub fn with_bid_sources<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize, u64) -> Box<dyn BidSource> + Send + Sync + 'static,
    {
        self.sources = Box::new(factory);
        self
    }

    /// Route progress events to `sink` instead of tracing.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Seed in effect for this auction.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run every round and stop all bidders.
    pub async fn run(&self) -> Result<AuctionReport, RendezvousError> {
        let bidder_count = self.config.bidders;
        let (bid_tx, bid_rx) = mpsc::channel(bidder_count);

        tracing::info!(
            items = self.config.items.len(),
            bidders = bidder_count,
            wallet = self.config.wallet,
            seed = self.seed,
            "auction opening"
        );

        let mut seats = Vec::with_capacity(bidder_count);
        let mut running = Vec::with_capacity(bidder_count);
        for seat in 0..bidder_count {
            let id = format!("bidder-{}", seat);
            // One slot: a bidder can hold at most one pending instruction
            let (command_tx, command_rx) = mpsc::channel::<BidderCommand>(1);
            let bidder = Bidder::new(
                id.clone(),
                self.config.wallet,
                (self.sources)(seat, self.seed),
                command_rx,
                bid_tx.clone(),
                self.sink.clone(),
            );
            running.push(participant::spawn(bidder));
            seats.push(Seat {
                bidder: id,
                commands: command_tx,
            });
        }
        drop(bid_tx);

        let mut auctioneer =
            Auctioneer::new(self.config.items.clone(), seats, bid_rx, self.sink.clone());
        let outcome = auctioneer.run().await;

        // Bidders stop once the auctioneer has dropped their command channels
        let bidders = participant::join_all(running).await?;
        outcome?;

        let report = AuctionReport {
            seed: self.seed,
            auctioneer: auctioneer.summary(),
            bidders: bidders
                .iter()
                .map(|b| BidderOutcome {
                    summary: b.summary(),
                    starting_wallet: b.starting_wallet(),
                    wallet: b.wallet(),
                    wins: b.wins(),
                })
                .collect(),
            sales: auctioneer.into_sales(),
        };

        tracing::info!(sold = report.sales.len(), "auction finished");
        Ok(report)
    }
}
