// ABOUTME: Serde-backed configuration for exchange and auction runs.
// ABOUTME: Loads from JSON, fills defaults, and validates before any task starts.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Items sold when no list is configured.
pub const DEFAULT_ITEMS: [&str; 5] = [
    "The \"Best Gopher\" trophy",
    "A mentoring session",
    "Two conference tickets",
    "Signed copy of \"Beautiful Code\"",
    "Vintage plushie",
];

/// Configuration for the producer/consumer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Number of producer tasks. Also the capacity of the offer channel.
    pub producers: usize,
    /// Number of consumer tasks.
    pub consumers: usize,
    /// Completed units after which the exchange shuts down.
    pub limit: u64,
    /// Simulated time a producer spends on each unit, in milliseconds.
    pub work_time_ms: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            producers: 3,
            consumers: 20,
            limit: 40,
            work_time_ms: 0,
        }
    }
}

impl ExchangeConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the exchange can make progress.
    ///
    /// With no producers or no consumers every task would block forever, and
    /// a zero limit could never be reached by counting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producers == 0 {
            return Err(invalid("producers", "at least one producer is required"));
        }
        if self.consumers == 0 {
            return Err(invalid("consumers", "at least one consumer is required"));
        }
        if self.limit == 0 {
            return Err(invalid("limit", "must be positive"));
        }
        Ok(())
    }

    /// Per-unit work time as a duration.
    pub fn work_time(&self) -> Duration {
        Duration::from_millis(self.work_time_ms)
    }
}

/// Configuration for the round-based auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Items sold, one round each, in order.
    pub items: Vec<String>,
    /// Number of bidder tasks. Also the capacity of the bid channel.
    pub bidders: usize,
    /// Starting wallet of every bidder.
    pub wallet: u64,
    /// Seed for the bid generators. Drawn at random and logged when absent.
    pub seed: Option<u64>,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS.iter().map(|s| s.to_string()).collect(),
            bidders: 10,
            wallet: 250,
            seed: None,
        }
    }
}

impl AuctionConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that every round can complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items.is_empty() {
            return Err(ConfigError::NoItems);
        }
        if self.bidders == 0 {
            return Err(invalid("bidders", "at least one bidder is required"));
        }
        if let Some(blank) = self.items.iter().position(|i| i.trim().is_empty()) {
            return Err(invalid("items", format!("item {} has an empty name", blank)));
        }
        Ok(())
    }
}

/// Combined settings file: `{"exchange": {...}, "auction": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub exchange: ExchangeConfig,
    pub auction: AuctionConfig,
}

impl Settings {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.exchange.validate()?;
        settings.auction.validate()?;
        Ok(settings)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
