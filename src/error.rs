// ABOUTME: Defines all error types for the rendezvous library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under RendezvousError.

/// Top-level error type for the rendezvous library.
#[derive(Debug, thiserror::Error)]
pub enum RendezvousError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Participant error: {0}")]
    Participant(#[from] ParticipantError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Auction has no items to sell")]
    NoItems,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from participant tasks during a run.
#[derive(Debug, thiserror::Error)]
pub enum ParticipantError {
    #[error("Task for '{name}' failed: {source}")]
    Join {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Bidder '{0}' stopped before the auction finished")]
    BidderGone(String),

    #[error("Bid channel closed during round for '{0}'")]
    BidsClosed(String),
}

/// Errors from roster-style inputs (friend graphs, album lists).
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Unknown friend: {0}")]
    UnknownFriend(String),

    #[error("Duplicate friend id: {0}")]
    DuplicateFriend(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
