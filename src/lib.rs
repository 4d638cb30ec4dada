// ABOUTME: Root module for rendezvous - bounded concurrent exchanges and round-based auctions.
// ABOUTME: Re-exports the public types from submodules.

pub mod auction;
pub mod brackets;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod exchange;
pub mod fanout;
pub mod gossip;
pub mod participant;
pub mod playlist;
pub mod prelude;

pub use error::RendezvousError;
