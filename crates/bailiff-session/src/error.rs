//! Error types for the session layer.

use bailiff_store::StoreError;

/// Errors that can occur while opening or closing sessions.
///
/// Closing a session that was never opened is not an error; it is logged
/// and ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Storage rejected a session write or read.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The lifecycle manager has been shut down and accepts no new
    /// sessions.
    #[error("session lifecycle is shut down")]
    ShutDown,
}
