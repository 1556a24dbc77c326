//! Issuing and lifting punishments.
//!
//! The coordinator is the only way staff actions reach storage. It enforces
//! one rule the store does not: a player has at most one active ban and at
//! most one active mute per service. Issuing a new one first lifts the old
//! one, crediting the new issuer with the pardon.

use std::sync::Arc;

use bailiff_store::PunishmentStore;
use bailiff_types::{PlayerId, Punishment, PunishmentKind, Target};
use chrono::{TimeDelta, Utc};

use crate::{IdentityResolver, ModerationConfig, ModerationError, MuteCache, Verdict};

/// Issues, pardons, and queries punishments.
pub struct Coordinator<S, R> {
    store: Arc<S>,
    resolver: Arc<R>,
    cache: MuteCache,
    config: Arc<ModerationConfig>,
}

impl<S, R> Clone for Coordinator<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            cache: self.cache.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, R> Coordinator<S, R>
where
    S: PunishmentStore,
    R: IdentityResolver,
{
    /// Creates a coordinator that evicts from (and fills) `cache`.
    pub fn new(
        store: Arc<S>,
        resolver: Arc<R>,
        cache: MuteCache,
        config: ModerationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            cache,
            config: Arc::new(config.validated()),
        }
    }

    // =====================================================================
    // Issue / lift
    // =====================================================================

    /// Records a new punishment.
    ///
    /// - **Ban / temp-ban**: any active ban against the target under the
    ///   same service is pardoned first, by the new issuer.
    /// - **Mute**: any active mute is lifted first (evicting the cache),
    ///   then the new mute is cached if it belongs to this service.
    /// - **Kick / warn**: written as-is.
    ///
    /// # Errors
    /// - [`ModerationError::InvalidPunishment`]: nothing was written.
    /// - [`ModerationError::Store`]: the lift or the save failed.
    pub async fn issue(
        &self,
        punishment: Punishment,
    ) -> Result<Punishment, ModerationError> {
        validate(&punishment)?;

        let target = punishment.target;
        if punishment.is_ban() || punishment.kind == PunishmentKind::Mute {
            let lifted = self
                .lift(target, punishment.kind, &punishment.service, punishment.issuer)
                .await?;
            if lifted {
                tracing::info!(
                    %target,
                    kind = %punishment.kind,
                    "existing punishment superseded"
                );
            }
        }

        self.store.save(punishment.clone()).await?;

        if punishment.kind == PunishmentKind::Mute
            && punishment.matches_service(&self.config.service)
        {
            self.cache.insert(target, punishment.clone());
        }

        tracing::info!(
            %target,
            id = %punishment.id,
            kind = %punishment.kind,
            silent = punishment.silent,
            "punishment issued"
        );
        Ok(punishment)
    }

    /// Lifts `target`'s active ban on this service.
    ///
    /// Returns `Ok(false)` if the target has no active ban, or if a display
    /// name resolves to nobody. The mute cache is not touched.
    pub async fn pardon(
        &self,
        target: impl Into<Target>,
        issuer: Option<PlayerId>,
    ) -> Result<bool, ModerationError> {
        let Some(player) = self.lookup(&target.into()).await else {
            return Ok(false);
        };
        let lifted = self
            .lift(player, PunishmentKind::Ban, &self.config.service, issuer)
            .await?;
        tracing::info!(%player, lifted, "pardon processed");
        Ok(lifted)
    }

    /// Lifts `target`'s active mute on this service.
    ///
    /// The cache entry is gone by the time this returns `Ok`, so the next
    /// [`MuteCache::is_muted`] already sees the player unmuted. Returns
    /// `Ok(false)` if nothing was active or the name resolves to nobody.
    pub async fn unmute(
        &self,
        target: impl Into<Target>,
        issuer: Option<PlayerId>,
    ) -> Result<bool, ModerationError> {
        let Some(player) = self.lookup(&target.into()).await else {
            return Ok(false);
        };
        let lifted = self
            .lift(player, PunishmentKind::Mute, &self.config.service, issuer)
            .await?;
        tracing::info!(%player, lifted, "unmute processed");
        Ok(lifted)
    }

    /// Deactivates the target's active punishments in `kind`'s category.
    ///
    /// For mutes on this service, the cache entry is evicted as soon as the
    /// store confirms the write (whether or not anything was active), and
    /// before the caller sees the result.
    async fn lift(
        &self,
        player: PlayerId,
        kind: PunishmentKind,
        service: &str,
        issuer: Option<PlayerId>,
    ) -> Result<bool, ModerationError> {
        let lifted = self
            .store
            .set_inactive(player, kind, service, issuer)
            .await?;

        if kind == PunishmentKind::Mute
            && service.eq_ignore_ascii_case(&self.config.service)
        {
            self.cache.remove(player);
        }
        Ok(lifted)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Resolves `target` to an identity key.
    ///
    /// # Errors
    /// [`ModerationError::IdentityNotFound`] if a name resolves to nobody.
    pub async fn resolve_target(
        &self,
        target: &Target,
    ) -> Result<PlayerId, ModerationError> {
        match target {
            Target::Id(id) => Ok(*id),
            Target::Name(name) => self
                .resolver
                .resolve_key(name)
                .await
                .ok_or_else(|| ModerationError::IdentityNotFound(name.clone())),
        }
    }

    /// Full punishment history of `target`, newest first.
    ///
    /// An unknown name yields an empty list.
    pub async fn query(
        &self,
        target: impl Into<Target>,
    ) -> Result<Vec<Punishment>, ModerationError> {
        match self.lookup(&target.into()).await {
            Some(player) => Ok(self.store.query_history(player).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Whether `target` has an active ban on this service.
    ///
    /// An unknown name is not banned.
    pub async fn is_banned(
        &self,
        target: impl Into<Target>,
    ) -> Result<bool, ModerationError> {
        let history = self.query(target).await?;
        Ok(Verdict::assess(&history, &self.config.service, Utc::now())
            .ban
            .is_some())
    }

    /// The active mute of `player` on this service, read from storage
    /// rather than the cache.
    pub async fn active_mute(
        &self,
        player: PlayerId,
    ) -> Result<Option<Punishment>, ModerationError> {
        let history = self.store.query_history(player).await?;
        Ok(Verdict::assess(&history, &self.config.service, Utc::now()).mute)
    }

    /// Everything `issuer` has handed out, newest first.
    pub async fn query_by_issuer(
        &self,
        issuer: PlayerId,
    ) -> Result<Vec<Punishment>, ModerationError> {
        Ok(self.store.query_by_issuer(issuer).await?)
    }

    /// Punishments issued within the last `period`, newest first.
    pub async fn recent(
        &self,
        period: TimeDelta,
    ) -> Result<Vec<Punishment>, ModerationError> {
        Ok(self.store.recent(period).await?)
    }

    /// Total number of punishment records.
    pub async fn count(&self) -> Result<usize, ModerationError> {
        Ok(self.store.count().await?)
    }

    /// [`resolve_target`](Self::resolve_target), with "nobody by that name"
    /// folded into `None`.
    async fn lookup(&self, target: &Target) -> Option<PlayerId> {
        match self.resolve_target(target).await {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::debug!(%target, error = %e, "target not resolved");
                None
            }
        }
    }
}

/// Rejects punishments that could never be (or no longer are) in force.
fn validate(punishment: &Punishment) -> Result<(), ModerationError> {
    if !punishment.active || punishment.pardon.is_some() {
        return Err(ModerationError::InvalidPunishment(
            "cannot issue an inactive punishment".into(),
        ));
    }
    if punishment.kind == PunishmentKind::TempBan && punishment.expires_at.is_none() {
        return Err(ModerationError::InvalidPunishment(
            "temporary ban needs an expiry".into(),
        ));
    }
    if let Some(expiry) = punishment.expires_at {
        if expiry <= punishment.issued_at {
            return Err(ModerationError::InvalidPunishment(
                "expiry must be after issue time".into(),
            ));
        }
    }
    Ok(())
}
