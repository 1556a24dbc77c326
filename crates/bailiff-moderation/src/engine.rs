//! The connection gate: decides whether a connecting player gets in.
//!
//! Resolution is a pipeline of small stages, each usable on its own:
//!
//! ```text
//! fetch (bounded) ──→ Verdict::assess ──→ apply_mutes ──→ render_screen
//!      │                                                      │
//!      │ timed out                                            ▼
//!      ▼                                              Decision::Reject
//! Decision::Provisional ──(Scheduler, later)──→ recheck ──→ kick / cache
//! ```
//!
//! The gate never waits on storage longer than the configured login
//! timeout. If storage is slow the player is let in and checked again
//! once the connection is up. If storage is broken the player is turned
//! away, because "we couldn't tell" must never count as "clean".

use std::sync::Arc;

use bailiff_store::PunishmentStore;
use bailiff_types::{PlayerId, Punishment, PunishmentId};
use chrono::Utc;

use crate::scheduler::jittered;
use crate::{
    render_screen, ConnectionGateway, IdentityResolver, ModerationConfig,
    ModerationError, MuteCache, Scheduler, Verdict,
};

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// What the gate tells the host to do with a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No ban applies. Let the player in.
    Accept,

    /// Storage was too slow to answer. Let the player in; a deferred
    /// re-check has been scheduled and may still remove them.
    Provisional,

    /// Turn the player away, showing them `message`.
    Reject {
        reason: RejectReason,
        message: String,
    },
}

impl Decision {
    /// Returns `true` for [`Accept`](Self::Accept) and
    /// [`Provisional`](Self::Provisional).
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Reject { .. })
    }

    /// The text shown to a rejected player.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Reject { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Why a connection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// An active ban for this service.
    Banned(PunishmentId),
    /// Storage failed; we cannot vouch for the player.
    StoreFailure,
}

/// What a deferred re-check ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckOutcome {
    /// The player left before the check finished. Nothing was done.
    Disconnected,
    /// No ban or mute applies.
    Clean,
    /// No ban, but a mute was cached.
    Muted,
    /// A ban applies and the player was kicked.
    Kicked(PunishmentId),
    /// Storage failed again. Nothing was done.
    Failed,
}

// ---------------------------------------------------------------------------
// ResolutionEngine
// ---------------------------------------------------------------------------

/// Resolves bans and mutes for connecting players.
///
/// Every field is shared, so cloning hands out another view of the same
/// engine. The deferred re-check relies on that to move a clone into its
/// task.
pub struct ResolutionEngine<S, R, G> {
    store: Arc<S>,
    resolver: Arc<R>,
    gateway: Arc<G>,
    scheduler: Arc<dyn Scheduler>,
    cache: MuteCache,
    config: Arc<ModerationConfig>,
}

impl<S, R, G> Clone for ResolutionEngine<S, R, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            gateway: Arc::clone(&self.gateway),
            scheduler: Arc::clone(&self.scheduler),
            cache: self.cache.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, R, G> ResolutionEngine<S, R, G>
where
    S: PunishmentStore,
    R: IdentityResolver,
    G: ConnectionGateway,
{
    /// Creates an engine writing into `cache`.
    ///
    /// Pass the same cache to the [`Coordinator`](crate::Coordinator) so
    /// pardons evict what the gate inserted.
    pub fn new(
        store: Arc<S>,
        resolver: Arc<R>,
        gateway: Arc<G>,
        scheduler: Arc<dyn Scheduler>,
        cache: MuteCache,
        config: ModerationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            gateway,
            scheduler,
            cache,
            config: Arc::new(config.validated()),
        }
    }

    /// The mute cache this engine writes to.
    pub fn cache(&self) -> &MuteCache {
        &self.cache
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// The mute currently gating `player`'s chat, if any.
    pub fn is_muted(&self, player: PlayerId) -> Option<Punishment> {
        self.cache.is_muted(player)
    }

    /// Runs the connection gate for `player`.
    ///
    /// Call once per connection attempt. Returns within the login timeout
    /// (plus however long rendering a ban screen takes).
    pub async fn resolve_on_connect(&self, player: PlayerId) -> Decision {
        let seen = self.cache.generation(player);
        let history = match self.fetch(player).await {
            Ok(history) => history,
            Err(ModerationError::StoreTimeout { timeout, .. }) => {
                tracing::warn!(
                    %player,
                    timeout_ms = timeout.as_millis() as u64,
                    "punishment lookup timed out: admitting provisionally"
                );
                self.schedule_recheck(player);
                return Decision::Provisional;
            }
            Err(e) => {
                tracing::error!(%player, error = %e, "punishment lookup failed: rejecting");
                return Decision::Reject {
                    reason: RejectReason::StoreFailure,
                    message: self.config.error_message.clone(),
                };
            }
        };

        let verdict = Verdict::assess(&history, &self.config.service, Utc::now());
        self.apply_mutes(player, &verdict, seen);

        tracing::info!(
            %player,
            count = history.len(),
            banned = verdict.ban.is_some(),
            muted = verdict.mute.is_some(),
            "punishments fetched"
        );

        match verdict.ban {
            Some(ban) => Decision::Reject {
                reason: RejectReason::Banned(ban.id),
                message: self.render_screen(&ban).await,
            },
            None => Decision::Accept,
        }
    }

    /// Fetches `player`'s history, giving up after the login timeout.
    pub async fn fetch(
        &self,
        player: PlayerId,
    ) -> Result<Vec<Punishment>, ModerationError> {
        let timeout = self.config.login_timeout();
        match tokio::time::timeout(timeout, self.store.query_history(player)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ModerationError::StoreTimeout { player, timeout }),
        }
    }

    /// Makes the cache agree with `verdict`: set the mute if there is one,
    /// drop any stale entry if there isn't.
    ///
    /// `seen` is the cache generation read before the history was fetched.
    /// If an issue or unmute landed since, the cache already reflects a
    /// newer state than `verdict` and is left alone.
    fn apply_mutes(&self, player: PlayerId, verdict: &Verdict, seen: u64) {
        if !self.cache.sync_from(player, verdict.mute.as_ref(), seen) {
            tracing::debug!(%player, "mute changed during lookup: cache left as is");
        }
    }

    /// Renders the screen for `punishment`, resolving the issuer's display
    /// name (or the console name for system-issued punishments).
    pub async fn render_screen(&self, punishment: &Punishment) -> String {
        let issuer_name = match punishment.issuer {
            Some(issuer) => self.resolver.render_display_name(issuer).await,
            None => self.config.console_name.clone(),
        };
        render_screen(punishment, &issuer_name, &self.config)
    }

    /// Re-runs resolution for a player who is already connected.
    ///
    /// No timeout applies here: the player is in, and nothing is waiting
    /// on this. If the player has left, either before the fetch or while it
    /// ran, nothing is done.
    pub async fn recheck(&self, player: PlayerId) -> RecheckOutcome {
        if !self.gateway.is_connected(player) {
            tracing::debug!(%player, "deferred check skipped: player already left");
            return RecheckOutcome::Disconnected;
        }

        let seen = self.cache.generation(player);
        let history = match self.store.query_history(player).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(%player, error = %e, "deferred punishment lookup failed");
                return RecheckOutcome::Failed;
            }
        };

        if !self.gateway.is_connected(player) {
            tracing::debug!(%player, "deferred check dropped: player left during lookup");
            return RecheckOutcome::Disconnected;
        }

        let verdict = Verdict::assess(&history, &self.config.service, Utc::now());
        self.apply_mutes(player, &verdict, seen);

        tracing::info!(
            %player,
            count = history.len(),
            deferred = true,
            "punishments fetched"
        );

        if let Some(ban) = &verdict.ban {
            let screen = self.render_screen(ban).await;
            tracing::warn!(
                %player,
                punishment = %ban.id,
                "banned player removed by deferred check"
            );
            self.gateway.kick(player, screen).await;
            return RecheckOutcome::Kicked(ban.id);
        }

        if verdict.mute.is_some() {
            RecheckOutcome::Muted
        } else {
            RecheckOutcome::Clean
        }
    }

    fn schedule_recheck(&self, player: PlayerId) {
        let delay = jittered(self.config.recheck_delay(), self.config.recheck_jitter());
        let engine = self.clone();
        tracing::debug!(%player, delay_ms = delay.as_millis() as u64, "deferred check scheduled");
        self.scheduler.run_after(
            delay,
            Box::pin(async move {
                engine.recheck(player).await;
            }),
        );
    }
}
