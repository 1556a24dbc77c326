//! The mute cache: who is muted right now, without a storage round-trip.
//!
//! Chat gating asks "is this player muted?" on every message, so the answer
//! has to come from memory. The cache is filled by the connection gate and
//! kept honest by the coordinator (issue / unmute).
//!
//! # Concurrency note
//!
//! Every write is a whole-entry set or remove keyed by player, so a plain
//! `std::sync::RwLock` is enough, with critical sections that never span an
//! `.await`. A poisoned lock is recovered because no write can leave the
//! map half-updated.
//!
//! The gate writes from a history snapshot read before its lookup, and the
//! lookup can take seconds. Each coordinator write bumps a per-player
//! generation; the gate records the generation before it reads and its
//! write is dropped if the generation has moved since. An unmute
//! acknowledged mid-lookup therefore stays unmuted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use bailiff_types::{PlayerId, Punishment, PunishmentKind};
use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
struct Entries {
    mutes: HashMap<PlayerId, Punishment>,
    /// Coordinator writes seen per player.
    generations: HashMap<PlayerId, u64>,
}

impl Entries {
    fn bump(&mut self, player: PlayerId) {
        *self.generations.entry(player).or_default() += 1;
    }

    fn generation(&self, player: PlayerId) -> u64 {
        self.generations.get(&player).copied().unwrap_or_default()
    }
}

/// Process-local map from player to their active mute.
///
/// Cloning is cheap and yields a handle to the same map. Anyone can read;
/// only this crate's [`ResolutionEngine`](crate::ResolutionEngine) and
/// [`Coordinator`](crate::Coordinator) write.
#[derive(Debug, Clone, Default)]
pub struct MuteCache {
    entries: Arc<RwLock<Entries>>,
}

impl MuteCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mute currently gating `player`, if any.
    ///
    /// An entry whose expiry has passed is reported as "not muted"; it is
    /// left in place until the next resolution or unmute replaces it.
    pub fn is_muted(&self, player: PlayerId) -> Option<Punishment> {
        self.is_muted_at(player, Utc::now())
    }

    /// [`is_muted`](Self::is_muted) evaluated at `now`.
    pub fn is_muted_at(
        &self,
        player: PlayerId,
        now: DateTime<Utc>,
    ) -> Option<Punishment> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .mutes
            .get(&player)
            .filter(|mute| mute.is_active_at(now))
            .cloned()
    }

    /// Number of cached entries (expired ones included).
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .mutes
            .len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sets (or replaces) the mute for `player`.
    pub(crate) fn insert(&self, player: PlayerId, mute: Punishment) {
        debug_assert_eq!(mute.kind, PunishmentKind::Mute);
        let mut entries = self.write();
        entries.bump(player);
        entries.mutes.insert(player, mute);
    }

    /// Drops the entry for `player`, returning it if there was one.
    pub(crate) fn remove(&self, player: PlayerId) -> Option<Punishment> {
        let mut entries = self.write();
        entries.bump(player);
        entries.mutes.remove(&player)
    }

    /// The write generation of `player`. Read it before fetching the
    /// history passed to [`sync_from`](Self::sync_from).
    pub(crate) fn generation(&self, player: PlayerId) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation(player)
    }

    /// Sets or clears `player`'s entry from a history snapshot, unless an
    /// insert or remove happened after `seen` was read.
    ///
    /// Returns `false` if the write was skipped.
    pub(crate) fn sync_from(
        &self,
        player: PlayerId,
        mute: Option<&Punishment>,
        seen: u64,
    ) -> bool {
        let mut entries = self.write();
        if entries.generation(player) != seen {
            return false;
        }
        match mute {
            Some(mute) => {
                entries.mutes.insert(player, mute.clone());
            }
            None => {
                if entries.mutes.remove(&player).is_some() {
                    tracing::debug!(%player, "stale mute dropped from cache");
                }
            }
        }
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
