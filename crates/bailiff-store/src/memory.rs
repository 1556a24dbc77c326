//! In-process store backed by `Vec`s behind Tokio `RwLock`s.
//!
//! Good enough for tests, demos, and a single server that can afford to
//! lose history on restart. It also has an availability switch so tests
//! can simulate a storage outage without a second implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use bailiff_types::{PlayerId, Punishment, PunishmentKind, SessionRecord};
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::{PunishmentStore, SessionStore, StoreError};

/// A [`PunishmentStore`] + [`SessionStore`] that keeps everything in memory.
pub struct MemoryStore {
    punishments: RwLock<Vec<Punishment>>,
    sessions: RwLock<Vec<SessionRecord>>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty, available store.
    pub fn new() -> Self {
        Self {
            punishments: RwLock::new(Vec::new()),
            sessions: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles simulated availability. While unavailable, every call fails
    /// with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        tracing::debug!(available, "memory store availability changed");
    }

    /// Every stored session record, in insertion order.
    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.read().await.clone()
    }

    /// Every stored punishment record, in insertion order.
    pub async fn punishments(&self) -> Vec<Punishment> {
        self.punishments.read().await.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".into()))
        }
    }

    async fn collect_newest_first(
        &self,
        filter: impl Fn(&Punishment) -> bool,
    ) -> Vec<Punishment> {
        let mut out: Vec<Punishment> = self
            .punishments
            .read()
            .await
            .iter()
            .filter(|p| filter(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        out
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PunishmentStore for MemoryStore {
    async fn query_history(
        &self,
        target: PlayerId,
    ) -> Result<Vec<Punishment>, StoreError> {
        self.check_available()?;
        Ok(self.collect_newest_first(|p| p.target == target).await)
    }

    async fn save(&self, punishment: Punishment) -> Result<(), StoreError> {
        self.check_available()?;
        tracing::trace!(id = %punishment.id, kind = %punishment.kind, "storing punishment");
        self.punishments.write().await.push(punishment);
        Ok(())
    }

    async fn set_inactive(
        &self,
        target: PlayerId,
        kind: PunishmentKind,
        service: &str,
        pardoner: Option<PlayerId>,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let now = Utc::now();
        let mut changed = false;
        for p in self.punishments.write().await.iter_mut() {
            if p.target == target
                && p.kind.same_category(kind)
                && p.matches_service(service)
                && p.is_active_at(now)
            {
                p.pardon(pardoner, now);
                changed = true;
            }
        }
        Ok(changed)
    }

    async fn query_by_issuer(
        &self,
        issuer: PlayerId,
    ) -> Result<Vec<Punishment>, StoreError> {
        self.check_available()?;
        Ok(self
            .collect_newest_first(|p| p.issuer == Some(issuer))
            .await)
    }

    async fn recent(
        &self,
        period: TimeDelta,
    ) -> Result<Vec<Punishment>, StoreError> {
        self.check_available()?;
        let since = Utc::now() - period;
        Ok(self.collect_newest_first(|p| p.issued_at >= since).await)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.check_available()?;
        Ok(self.punishments.read().await.len())
    }
}

impl SessionStore for MemoryStore {
    async fn save_session(
        &self,
        session: SessionRecord,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.sessions.write().await.push(session);
        Ok(())
    }

    async fn update_session_end(
        &self,
        session: &SessionRecord,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut sessions = self.sessions.write().await;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(stored) => {
                stored.ended_at = session.ended_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn latest_session(
        &self,
        player: PlayerId,
        ignore_vanished: bool,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .sessions
            .read()
            .await
            .iter()
            .filter(|s| s.player == player && !(ignore_vanished && s.vanished))
            .max_by_key(|s| s.started_at)
            .cloned())
    }
}
