// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use rendezvous::prelude::*;` to get started quickly.

pub use crate::auction::{
    Auction, AuctionReport, Bid, BidSource, BidderOutcome, RandomBids, Sale, ScriptedBids,
    select_winner,
};
pub use crate::brackets::is_balanced;
pub use crate::config::{AuctionConfig, DEFAULT_ITEMS, ExchangeConfig, Settings};
pub use crate::coordinator::{ExchangeCounter, Shutdown, UnitOutcome, WorkChannel};
pub use crate::error::{ConfigError, ParticipantError, RendezvousError, RosterError};
pub use crate::event::{Event, EventSink, MemorySink, TracingSink};
pub use crate::exchange::{Exchange, ExchangeReport, Order, Receipt};
pub use crate::fanout::{Sequence, SequenceReport, Step, fan_out, run_sequences};
pub use crate::gossip::{Friend, FriendGraph};
pub use crate::participant::{Participant, ParticipantState, ParticipantSummary, Role};
pub use crate::playlist::{Song, load_albums, merge_albums, parse_albums};
