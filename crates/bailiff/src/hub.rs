//! The `Bailiff` hub and its builder.
//!
//! This is the entry point for a host. It wires every layer to one store
//! and one mute cache, and exposes one handler per host event:
//!
//! ```text
//! pre-login ──→ on_pre_login ──→ ResolutionEngine ──┐
//! join      ──→ on_join      ──→ SessionLifecycle   ├──→ store
//! quit      ──→ on_quit      ──→ SessionLifecycle   │
//! staff     ──→ issue/pardon ──→ Coordinator ───────┘
//!                                     │
//! chat      ──→ is_muted ──→ MuteCache ◄┘
//! ```

use std::sync::Arc;

use bailiff_moderation::{
    ConnectionGateway, Coordinator, Decision, IdentityResolver, ModerationConfig, MuteCache,
    ResolutionEngine, Scheduler, TokioScheduler,
};
use bailiff_session::{SessionConfig, SessionLifecycle, TransitionGuard};
use bailiff_store::{PunishmentStore, SessionStore};
use bailiff_types::{PlayerId, Punishment, SessionRecord, Target};

use crate::{BailiffConfig, BailiffError};

/// Builder for a [`Bailiff`] hub.
///
/// # Example
///
/// ```rust,ignore
/// use bailiff::prelude::*;
///
/// let bailiff = Bailiff::builder()
///     .service("core")
///     .build(MemoryStore::new(), my_resolver, my_gateway);
/// let decision = bailiff.on_pre_login(player).await;
/// ```
pub struct BailiffBuilder {
    config: BailiffConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl BailiffBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: BailiffConfig::default(),
            scheduler: None,
        }
    }

    /// Sets the service tag of this deployment.
    pub fn service(mut self, service: &str) -> Self {
        self.config.moderation.service = service.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BailiffConfig) -> Self {
        self.config = config;
        self
    }

    pub fn moderation_config(mut self, config: ModerationConfig) -> Self {
        self.config.moderation = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.sessions = config;
        self
    }

    /// Sets where deferred re-checks run. Defaults to [`TokioScheduler`].
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Wires the layers together around `store`.
    pub fn build<S, R, G>(self, store: S, resolver: R, gateway: G) -> Bailiff<S, R, G>
    where
        S: PunishmentStore + SessionStore,
        R: IdentityResolver,
        G: ConnectionGateway,
    {
        let store = Arc::new(store);
        let resolver = Arc::new(resolver);
        let cache = MuteCache::new();
        let moderation = self.config.moderation.validated();
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler) as Arc<dyn Scheduler>);

        tracing::info!(service = %moderation.service, "bailiff ready");

        Bailiff {
            engine: ResolutionEngine::new(
                Arc::clone(&store),
                Arc::clone(&resolver),
                Arc::new(gateway),
                scheduler,
                cache.clone(),
                moderation.clone(),
            ),
            coordinator: Coordinator::new(
                Arc::clone(&store),
                resolver,
                cache.clone(),
                moderation,
            ),
            sessions: SessionLifecycle::new(store, self.config.sessions),
            cache,
        }
    }
}

impl Default for BailiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Moderation and session tracking for one deployment.
pub struct Bailiff<S, R, G> {
    engine: ResolutionEngine<S, R, G>,
    coordinator: Coordinator<S, R>,
    sessions: SessionLifecycle<S>,
    cache: MuteCache,
}

impl<S, R, G> Bailiff<S, R, G>
where
    S: PunishmentStore + SessionStore,
    R: IdentityResolver,
    G: ConnectionGateway,
{
    /// Creates a new builder.
    pub fn builder() -> BailiffBuilder {
        BailiffBuilder::new()
    }

    // =====================================================================
    // Host events
    // =====================================================================

    /// Decides whether `player` may connect. Call once per attempt, before
    /// the player is admitted.
    pub async fn on_pre_login(&self, player: PlayerId) -> Decision {
        self.engine.resolve_on_connect(player).await
    }

    /// The player has joined. Opens a session unless this is visibility
    /// churn.
    pub async fn on_join(
        &self,
        player: PlayerId,
        vanished: bool,
    ) -> Result<Option<SessionRecord>, BailiffError> {
        Ok(self.sessions.handle_connect(player, vanished).await?)
    }

    /// The player has left. Closes their session unless this is
    /// visibility churn.
    pub async fn on_quit(
        &self,
        player: PlayerId,
    ) -> Result<Option<SessionRecord>, BailiffError> {
        Ok(self.sessions.handle_disconnect(player).await?)
    }

    /// Marks `player` as toggling visibility until the guard is dropped.
    pub fn begin_visibility_toggle(&self, player: PlayerId) -> TransitionGuard {
        self.sessions.begin_transition(player)
    }

    pub fn mark_transition_start(&self, player: PlayerId) {
        self.sessions.mark_transition_start(player);
    }

    pub fn mark_transition_end(&self, player: PlayerId) {
        self.sessions.mark_transition_end(player);
    }

    /// Whether `player` is mid visibility toggle. Listeners should ignore
    /// join/quit events for them while this is `true`.
    pub fn is_in_transition(&self, player: PlayerId) -> bool {
        self.sessions.is_in_transition(player)
    }

    /// The mute gating `player`'s chat, if any. Never touches storage.
    pub fn is_muted(&self, player: PlayerId) -> Option<Punishment> {
        self.cache.is_muted(player)
    }

    // =====================================================================
    // Staff actions
    // =====================================================================

    /// Records a punishment, superseding any active one of the same
    /// category.
    pub async fn issue(&self, punishment: Punishment) -> Result<Punishment, BailiffError> {
        Ok(self.coordinator.issue(punishment).await?)
    }

    /// Lifts the active ban of `target`, given as a UUID or a display name.
    ///
    /// Returns `Ok(false)` if nothing was active or the name is unknown.
    ///
    /// # Errors
    /// [`BailiffError::Types`] if `target` is neither a UUID nor a valid
    /// name.
    pub async fn pardon(
        &self,
        target: &str,
        issuer: Option<PlayerId>,
    ) -> Result<bool, BailiffError> {
        let target: Target = target.parse()?;
        Ok(self.coordinator.pardon(target, issuer).await?)
    }

    /// Lifts the active mute of `target`, given as a UUID or a display name.
    ///
    /// The player can chat again as soon as this returns.
    pub async fn unmute(
        &self,
        target: &str,
        issuer: Option<PlayerId>,
    ) -> Result<bool, BailiffError> {
        let target: Target = target.parse()?;
        Ok(self.coordinator.unmute(target, issuer).await?)
    }

    /// Full punishment history of `target`, newest first.
    pub async fn history(&self, target: &str) -> Result<Vec<Punishment>, BailiffError> {
        let target: Target = target.parse()?;
        Ok(self.coordinator.query(target).await?)
    }

    // =====================================================================
    // Lifecycle
    // =====================================================================

    /// Closes every open session. Call when the host stops.
    pub async fn shutdown(&self) -> Result<usize, BailiffError> {
        let closed = self.sessions.shutdown().await?;
        tracing::info!(closed, "bailiff shut down");
        Ok(closed)
    }

    pub fn engine(&self) -> &ResolutionEngine<S, R, G> {
        &self.engine
    }

    pub fn coordinator(&self) -> &Coordinator<S, R> {
        &self.coordinator
    }

    pub fn sessions(&self) -> &SessionLifecycle<S> {
        &self.sessions
    }

    pub fn cache(&self) -> &MuteCache {
        &self.cache
    }
}
