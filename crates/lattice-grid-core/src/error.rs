//! Error types for Lattice Grid core systems.

use crate::signal::ConnectionId;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// The main error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Signal-related error.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID {0:?}")]
    InvalidConnection(ConnectionId),
}
