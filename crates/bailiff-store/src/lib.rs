//! Storage abstraction layer for Bailiff.
//!
//! Provides the [`PunishmentStore`] and [`SessionStore`] traits that the
//! moderation and session layers talk to. A real deployment backs them with
//! a database; this crate ships [`MemoryStore`] for tests, demos, and
//! single-process servers.
//!
//! # Feature Flags
//!
//! - `memory` (default): the in-process [`MemoryStore`]

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::StoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;

use std::future::Future;

use bailiff_types::{PlayerId, Punishment, PunishmentKind, SessionRecord};
use chrono::TimeDelta;

/// Durable storage for punishment records.
///
/// Every method is async and may be slow; the connection gate wraps
/// [`query_history`](Self::query_history) in its own timeout. Methods
/// return `impl Future + Send` so callers can move the work into spawned
/// tasks.
pub trait PunishmentStore: Send + Sync + 'static {
    /// Every punishment ever issued against `target`, newest first,
    /// including pardoned and expired ones.
    fn query_history(
        &self,
        target: PlayerId,
    ) -> impl Future<Output = Result<Vec<Punishment>, StoreError>> + Send;

    /// Persists a newly issued punishment.
    fn save(
        &self,
        punishment: Punishment,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deactivates every currently active punishment against `target` in
    /// the same category as `kind` (bans or mutes) issued under `service`,
    /// recording `pardoner` as the actor.
    ///
    /// Returns `Ok(false)` if nothing active matched.
    fn set_inactive(
        &self,
        target: PlayerId,
        kind: PunishmentKind,
        service: &str,
        pardoner: Option<PlayerId>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Every punishment issued by `issuer`, newest first.
    fn query_by_issuer(
        &self,
        issuer: PlayerId,
    ) -> impl Future<Output = Result<Vec<Punishment>, StoreError>> + Send;

    /// Punishments issued within the last `period`, newest first.
    fn recent(
        &self,
        period: TimeDelta,
    ) -> impl Future<Output = Result<Vec<Punishment>, StoreError>> + Send;

    /// Total number of punishment records.
    fn count(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// Durable storage for session records.
pub trait SessionStore: Send + Sync + 'static {
    /// Persists a newly opened session.
    fn save_session(
        &self,
        session: SessionRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes the end time of an existing session.
    ///
    /// Returns `Ok(false)` if no record with that ID exists.
    fn update_session_end(
        &self,
        session: &SessionRecord,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// The most recently started session of `player`. With
    /// `ignore_vanished`, sessions that started while hidden are skipped.
    fn latest_session(
        &self,
        player: PlayerId,
        ignore_vanished: bool,
    ) -> impl Future<Output = Result<Option<SessionRecord>, StoreError>> + Send;
}
