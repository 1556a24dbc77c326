//! Identity resolution hook.
//!
//! Bailiff doesn't own the account database. The host implements
//! [`IdentityResolver`] so the moderation layer can turn a display name into
//! a key (for staff commands) and a key into a display name (for ban
//! screens).

use std::future::Future;

use bailiff_types::PlayerId;

/// Maps between display names and identity keys.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use bailiff_moderation::IdentityResolver;
/// use bailiff_types::PlayerId;
///
/// /// Resolves from a fixed roster. Handy for tests and demos.
/// struct Roster(HashMap<String, PlayerId>);
///
/// impl IdentityResolver for Roster {
///     async fn resolve_key(&self, name: &str) -> Option<PlayerId> {
///         self.0
///             .iter()
///             .find(|(n, _)| n.eq_ignore_ascii_case(name))
///             .map(|(_, id)| *id)
///     }
///
///     async fn render_display_name(&self, player: PlayerId) -> String {
///         self.0
///             .iter()
///             .find(|(_, id)| **id == player)
///             .map(|(name, _)| name.clone())
///             .unwrap_or_else(|| player.to_string())
///     }
/// }
/// ```
pub trait IdentityResolver: Send + Sync + 'static {
    /// Looks up the key of the player currently known as `name`.
    ///
    /// Returns `None` if nobody by that name exists.
    fn resolve_key(
        &self,
        name: &str,
    ) -> impl Future<Output = Option<PlayerId>> + Send;

    /// Renders the display name for `player`, as shown on screens.
    ///
    /// Must always produce something; fall back to the key's string form
    /// when the name is unknown.
    fn render_display_name(
        &self,
        player: PlayerId,
    ) -> impl Future<Output = String> + Send;
}
