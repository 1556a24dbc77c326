//! Connection gateway hook: how the moderation layer reaches live players.

use std::future::Future;

use bailiff_types::PlayerId;

/// The host's view of who is connected right now.
///
/// Used only by the deferred re-check, which runs after a player was let
/// in provisionally and may have to remove them again.
pub trait ConnectionGateway: Send + Sync + 'static {
    /// Returns `true` if `player` currently holds a live connection.
    fn is_connected(&self, player: PlayerId) -> bool;

    /// Disconnects `player`, showing them `message`.
    fn kick(
        &self,
        player: PlayerId,
        message: String,
    ) -> impl Future<Output = ()> + Send;
}
