//! Error types for the dayflow core.

use thiserror::Error;

/// Errors that can occur in dayflow operations.
#[derive(Error, Debug)]
pub enum DayflowError {
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(i64),

    #[error("Event not found: {0}")]
    EventNotFound(i64),

    #[error("A subscription for '{0}' already exists")]
    DuplicateSubscription(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Why retrieving (or making sense of) a remote calendar failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Transport(String),

    #[error("response larger than {0} bytes")]
    TooLarge(u64),

    #[error("no valid events found")]
    NoValidEvents,
}

/// Result type alias for dayflow operations.
pub type DayflowResult<T> = Result<T, DayflowError>;
