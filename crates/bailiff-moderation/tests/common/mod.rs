//! Fakes shared by the moderation integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bailiff_moderation::{
    ConnectionGateway, Coordinator, IdentityResolver, ModerationConfig, MuteCache,
    ResolutionEngine, Scheduler, Task,
};
use bailiff_store::{MemoryStore, PunishmentStore, StoreError};
use bailiff_types::{PlayerId, Punishment, PunishmentKind};
use chrono::TimeDelta;

// =========================================================================
// Identity
// =========================================================================

/// Resolves names from a fixed roster.
#[derive(Default)]
pub struct Roster {
    names: Mutex<HashMap<String, PlayerId>>,
}

impl Roster {
    pub fn add(&self, name: &str) -> PlayerId {
        let id = PlayerId::random();
        self.names.lock().unwrap().insert(name.to_string(), id);
        id
    }
}

impl IdentityResolver for Roster {
    async fn resolve_key(&self, name: &str) -> Option<PlayerId> {
        self.names.lock().unwrap().get(name).copied()
    }

    async fn render_display_name(&self, player: PlayerId) -> String {
        self.names
            .lock()
            .unwrap()
            .iter()
            .find(|(_, id)| **id == player)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| player.to_string())
    }
}

// =========================================================================
// Connections
// =========================================================================

/// Tracks who is online and records every kick.
#[derive(Default)]
pub struct Gateway {
    online: Mutex<HashSet<PlayerId>>,
    kicks: Mutex<Vec<(PlayerId, String)>>,
}

impl Gateway {
    pub fn join(&self, player: PlayerId) {
        self.online.lock().unwrap().insert(player);
    }

    pub fn leave(&self, player: PlayerId) {
        self.online.lock().unwrap().remove(&player);
    }

    pub fn kicks(&self) -> Vec<(PlayerId, String)> {
        self.kicks.lock().unwrap().clone()
    }
}

impl ConnectionGateway for Gateway {
    fn is_connected(&self, player: PlayerId) -> bool {
        self.online.lock().unwrap().contains(&player)
    }

    async fn kick(&self, player: PlayerId, message: String) {
        self.online.lock().unwrap().remove(&player);
        self.kicks.lock().unwrap().push((player, message));
    }
}

// =========================================================================
// Scheduler
// =========================================================================

/// Queues tasks instead of running them; the test decides when.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    /// Runs every queued task to completion, in order.
    pub async fn run_all(&self) {
        let tasks: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        for (_, task) in tasks {
            task.await;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn run_after(&self, delay: Duration, task: Task) {
        self.pending.lock().unwrap().push((delay, task));
    }
}

// =========================================================================
// Stores
// =========================================================================

/// A [`MemoryStore`] whose history reads take `delay`.
pub struct SlowStore {
    pub inner: MemoryStore,
    pub delay: Duration,
    /// Read the history up front and hand it back after `delay`, so writes
    /// made during the wait are missing from the result.
    pub read_first: bool,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
            read_first: false,
        }
    }

    pub fn late(delay: Duration) -> Self {
        Self {
            read_first: true,
            ..Self::new(delay)
        }
    }
}

impl PunishmentStore for SlowStore {
    async fn query_history(&self, target: PlayerId) -> Result<Vec<Punishment>, StoreError> {
        if self.read_first {
            let history = self.inner.query_history(target).await;
            tokio::time::sleep(self.delay).await;
            return history;
        }
        tokio::time::sleep(self.delay).await;
        self.inner.query_history(target).await
    }

    async fn save(&self, punishment: Punishment) -> Result<(), StoreError> {
        self.inner.save(punishment).await
    }

    async fn set_inactive(
        &self,
        target: PlayerId,
        kind: PunishmentKind,
        service: &str,
        pardoner: Option<PlayerId>,
    ) -> Result<bool, StoreError> {
        self.inner.set_inactive(target, kind, service, pardoner).await
    }

    async fn query_by_issuer(&self, issuer: PlayerId) -> Result<Vec<Punishment>, StoreError> {
        self.inner.query_by_issuer(issuer).await
    }

    async fn recent(&self, period: TimeDelta) -> Result<Vec<Punishment>, StoreError> {
        self.inner.recent(period).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }
}

// =========================================================================
// Harness
// =========================================================================

/// Everything wired together the way the hub wires it.
pub struct Harness<S> {
    pub store: Arc<S>,
    pub roster: Arc<Roster>,
    pub gateway: Arc<Gateway>,
    pub scheduler: Arc<ManualScheduler>,
    pub cache: MuteCache,
    pub engine: ResolutionEngine<S, Roster, Gateway>,
    pub coordinator: Coordinator<S, Roster>,
}

impl<S: PunishmentStore> Harness<S> {
    pub fn new(store: S, config: ModerationConfig) -> Self {
        let store = Arc::new(store);
        let roster = Arc::new(Roster::default());
        let gateway = Arc::new(Gateway::default());
        let scheduler = Arc::new(ManualScheduler::default());
        let cache = MuteCache::new();
        let engine = ResolutionEngine::new(
            Arc::clone(&store),
            Arc::clone(&roster),
            Arc::clone(&gateway),
            Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            cache.clone(),
            config.clone(),
        );
        let coordinator = Coordinator::new(
            Arc::clone(&store),
            Arc::clone(&roster),
            cache.clone(),
            config,
        );
        Self {
            store,
            roster,
            gateway,
            scheduler,
            cache,
            engine,
            coordinator,
        }
    }
}

/// Config for a deployment tagged "core".
pub fn core_config() -> ModerationConfig {
    ModerationConfig {
        server_name: "Arena".into(),
        ..ModerationConfig::with_service("core")
    }
}

pub fn memory_harness() -> Harness<MemoryStore> {
    Harness::new(MemoryStore::new(), core_config())
}

pub fn punishment(
    kind: PunishmentKind,
    target: PlayerId,
    issuer: Option<PlayerId>,
    service: &str,
) -> Punishment {
    Punishment::new(kind, target, issuer, "rule breaking", service)
}
