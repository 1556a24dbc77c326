//! Error types for the moderation layer.

use std::time::Duration;

use bailiff_store::StoreError;
use bailiff_types::PlayerId;

/// Errors that can occur while resolving or issuing punishments.
///
/// Not every failure is an error here: a pardon with nothing to lift, or
/// a display name nobody owns, come back as `false` / an empty list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModerationError {
    /// The connection gate gave up waiting for punishment history.
    /// The gate recovers from this by admitting the player provisionally.
    #[error("punishment lookup for {player} timed out after {timeout:?}")]
    StoreTimeout { player: PlayerId, timeout: Duration },

    /// Storage returned an error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A display name did not resolve to any known player.
    #[error("no player named {0:?}")]
    IdentityNotFound(String),

    /// The punishment cannot be issued as given (e.g. a temp-ban without
    /// an expiry).
    #[error("invalid punishment: {0}")]
    InvalidPunishment(String),
}
