//! Error types for remote-console.

use thiserror::Error;

/// Main error type for remote-console operations.
///
/// The session controller itself never fails; only the async driver layer
/// can, when its transport channel or internal lock becomes unusable.
#[derive(Error, Debug)]
pub enum RemoteConsoleError {
    /// The outbound command channel was closed by the transport side.
    #[error("transport channel closed")]
    ChannelClosed,

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for remote-console operations.
pub type Result<T> = std::result::Result<T, RemoteConsoleError>;
