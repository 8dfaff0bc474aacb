use thiserror::Error;

/// Failure taxonomy for session operations.
///
/// Every controller operation returns one of these instead of logging and
/// moving on, so the embedding application decides whether to retry,
/// surface, or ignore.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Device enumeration or media capture failed.
    #[error("media capture failed: {0}")]
    Capture(String),

    /// Offer or answer creation was rejected by the peer connection.
    #[error("offer/answer creation failed: {0}")]
    Negotiation(String),

    /// A local or remote description was rejected by the peer connection.
    #[error("description rejected: {0}")]
    DescriptionApply(String),

    /// Data channel creation or send fault.
    #[error("data channel fault: {0}")]
    Channel(String),

    /// An operation was invoked out of order, e.g. creating a second
    /// connection without an intervening hangup.
    #[error("invalid session state: {0}")]
    InvalidState(String),
}
