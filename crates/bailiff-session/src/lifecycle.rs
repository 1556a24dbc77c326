//! The session lifecycle manager: opens and closes session records.
//!
//! Per player the state machine is:
//!
//! ```text
//! handle_connect() ──→ [open] ──→ handle_disconnect() ──→ [closed]
//!        ▲                                                    │
//!        └────────────── next connect, new record ────────────┘
//! ```
//!
//! Hosts that implement "vanish" by faking a quit and a join produce
//! connect/disconnect events that are not real. The host brackets those
//! with [`mark_transition_start`](SessionLifecycle::mark_transition_start)
//! (as early as it can) and
//! [`mark_transition_end`](SessionLifecycle::mark_transition_end) (as late
//! as it can). Inside that window the event handlers ignore the player, and
//! [`is_in_transition`](SessionLifecycle::is_in_transition) lets other
//! listeners do the same.
//!
//! # Concurrency note
//!
//! All three collections sit behind `std::sync::Mutex`es. Every method takes what it
//! needs out of a map, drops the guard, and only then awaits storage, so
//! no lock is ever held across an `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bailiff_store::SessionStore;
use bailiff_types::{PlayerId, SessionRecord};
use chrono::Utc;

use crate::{SessionConfig, SessionError};

type TransitionSet = Arc<Mutex<HashSet<PlayerId>>>;

/// Tracks open sessions and visibility transitions.
pub struct SessionLifecycle<S> {
    store: Arc<S>,
    config: SessionConfig,

    /// The single open session of each connected player.
    open: Mutex<HashMap<PlayerId, SessionRecord>>,

    /// Ended sessions whose end could not be written yet.
    unclosed: Mutex<Vec<SessionRecord>>,

    /// Players currently inside a visibility toggle. Shared with every
    /// outstanding [`TransitionGuard`].
    transitions: TransitionSet,

    shut_down: AtomicBool,
}

impl<S: SessionStore> SessionLifecycle<S> {
    pub fn new(store: Arc<S>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            open: Mutex::new(HashMap::new()),
            unclosed: Mutex::new(Vec::new()),
            transitions: Arc::new(Mutex::new(HashSet::new())),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =====================================================================
    // Event handlers
    // =====================================================================

    /// Handles a connect event.
    ///
    /// Returns the opened session, or `None` if tracking is disabled or the
    /// player is mid-transition.
    ///
    /// # Errors
    /// - [`SessionError::ShutDown`]: [`shutdown`](Self::shutdown) was called.
    /// - [`SessionError::Store`]: the record could not be written.
    pub async fn handle_connect(
        &self,
        player: PlayerId,
        vanished: bool,
    ) -> Result<Option<SessionRecord>, SessionError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(SessionError::ShutDown);
        }
        if !self.config.enabled {
            return Ok(None);
        }
        if self.is_in_transition(player) {
            tracing::debug!(%player, "connect during visibility toggle ignored");
            return Ok(None);
        }
        self.open(player, vanished).await.map(Some)
    }

    /// Handles a disconnect event.
    ///
    /// Returns the closed session, or `None` if there was nothing to close,
    /// tracking is disabled, or the player is mid-transition.
    pub async fn handle_disconnect(
        &self,
        player: PlayerId,
    ) -> Result<Option<SessionRecord>, SessionError> {
        if !self.config.enabled {
            return Ok(None);
        }
        if self.is_in_transition(player) {
            tracing::debug!(%player, "disconnect during visibility toggle ignored");
            return Ok(None);
        }
        self.close(player).await
    }

    // =====================================================================
    // Open / close
    // =====================================================================

    /// Opens a new session for `player`, closing any session still open
    /// for them first.
    ///
    /// Closes that failed earlier are retried first. If one of `player`'s
    /// own records is still open in storage afterwards, no new record is
    /// written.
    ///
    /// # Errors
    /// - [`SessionError::ShutDown`]: [`shutdown`](Self::shutdown) was called.
    /// - [`SessionError::Store`]: a write failed.
    pub async fn open(
        &self,
        player: PlayerId,
        vanished: bool,
    ) -> Result<SessionRecord, SessionError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(SessionError::ShutDown);
        }

        if let Err(e) = self.retry_unclosed().await {
            if self.has_unclosed(player) {
                return Err(e);
            }
        }

        let stale = self.lock_open().remove(&player);
        if let Some(mut stale) = stale {
            tracing::warn!(%player, session = %stale.id, "closing stale session before reopening");
            if let Err(e) = self.persist_end(&mut stale).await {
                self.defer_close(stale, &e);
                return Err(e);
            }
        }

        let record = SessionRecord::start(player, vanished, Utc::now());
        self.store.save_session(record.clone()).await?;

        // A concurrent open for the same player may have landed while we
        // were writing; keep ours and close theirs.
        let displaced = self.lock_open().insert(player, record.clone());
        if let Some(mut displaced) = displaced {
            tracing::warn!(%player, session = %displaced.id, "concurrent session displaced");
            if let Err(e) = self.persist_end(&mut displaced).await {
                self.defer_close(displaced, &e);
            }
        }

        tracing::info!(%player, session = %record.id, vanished, "session opened");
        Ok(record)
    }

    /// Closes `player`'s open session.
    ///
    /// Returns `Ok(None)` (and logs) if no session was open. If the write
    /// fails the record is kept and retried by the next
    /// [`open`](Self::open) or [`shutdown`](Self::shutdown), still ending at
    /// the time of this call.
    pub async fn close(
        &self,
        player: PlayerId,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let Some(mut record) = self.lock_open().remove(&player) else {
            tracing::debug!(%player, "no open session to close");
            return Ok(None);
        };
        if let Err(e) = self.persist_end(&mut record).await {
            self.defer_close(record, &e);
            return Err(e);
        }
        tracing::info!(
            %player,
            session = %record.id,
            secs = record.duration().map(|d| d.num_seconds()),
            "session closed"
        );
        Ok(Some(record))
    }

    /// Closes every open session and refuses new ones.
    ///
    /// Every session is attempted even if some writes fail. Returns how
    /// many were closed, or the first storage error. Sessions that could
    /// not be closed are kept, so calling this again retries them.
    pub async fn shutdown(&self) -> Result<usize, SessionError> {
        self.shut_down.store(true, Ordering::SeqCst);
        let open: Vec<SessionRecord> = self.lock_open().drain().map(|(_, s)| s).collect();
        self.lock_unclosed().extend(open);

        let result = self.retry_unclosed().await;
        match &result {
            Ok(closed) => tracing::info!(closed, "session lifecycle shut down"),
            Err(e) => tracing::error!(
                pending = self.pending_close_count(),
                error = %e,
                "session lifecycle shut down with sessions left open"
            ),
        }
        result
    }

    /// Number of sessions whose close is waiting to be retried.
    pub fn pending_close_count(&self) -> usize {
        self.lock_unclosed().len()
    }

    /// Stamps `record` with an end time (unless it has one) and writes it.
    async fn persist_end(&self, record: &mut SessionRecord) -> Result<(), SessionError> {
        record.end(Utc::now());
        if !self.store.update_session_end(record).await? {
            tracing::warn!(
                player = %record.player,
                session = %record.id,
                "closed session missing from store"
            );
        }
        Ok(())
    }

    fn defer_close(&self, record: SessionRecord, error: &SessionError) {
        tracing::warn!(
            player = %record.player,
            session = %record.id,
            %error,
            "session close failed: will retry"
        );
        self.lock_unclosed().push(record);
    }

    /// Retries every failed close. Records that fail again stay queued.
    ///
    /// Returns how many were closed, or the first storage error.
    async fn retry_unclosed(&self) -> Result<usize, SessionError> {
        let pending: Vec<SessionRecord> = self.lock_unclosed().drain(..).collect();

        let mut closed = 0;
        let mut first_error = None;
        for mut record in pending {
            match self.persist_end(&mut record).await {
                Ok(()) => closed += 1,
                Err(e) => {
                    tracing::error!(player = %record.player, error = %e, "failed to close session");
                    self.lock_unclosed().push(record);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(closed),
        }
    }

    fn has_unclosed(&self, player: PlayerId) -> bool {
        self.lock_unclosed().iter().any(|s| s.player == player)
    }

    fn lock_unclosed(&self) -> std::sync::MutexGuard<'_, Vec<SessionRecord>> {
        self.unclosed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_open(&self) -> std::sync::MutexGuard<'_, HashMap<PlayerId, SessionRecord>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =====================================================================
    // Transitions
    // =====================================================================

    /// Marks the start of a visibility toggle for `player`.
    pub fn mark_transition_start(&self, player: PlayerId) {
        mark(&self.transitions, player, true);
    }

    /// Marks the end of a visibility toggle for `player`.
    pub fn mark_transition_end(&self, player: PlayerId) {
        mark(&self.transitions, player, false);
    }

    /// Marks a visibility toggle that ends when the guard is dropped.
    pub fn begin_transition(&self, player: PlayerId) -> TransitionGuard {
        self.mark_transition_start(player);
        TransitionGuard {
            player,
            transitions: Arc::clone(&self.transitions),
        }
    }

    /// Whether `player` is inside a visibility toggle right now.
    pub fn is_in_transition(&self, player: PlayerId) -> bool {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&player)
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// The open session of `player`, if connected.
    pub fn current(&self, player: PlayerId) -> Option<SessionRecord> {
        self.lock_open().get(&player).cloned()
    }

    /// Number of open sessions.
    pub fn open_count(&self) -> usize {
        self.lock_open().len()
    }

    /// The most recent stored session of `player`, optionally skipping
    /// sessions that started while hidden.
    pub async fn latest_session(
        &self,
        player: PlayerId,
        ignore_vanished: bool,
    ) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.store.latest_session(player, ignore_vanished).await?)
    }

    /// [`latest_session`](Self::latest_session) as seen by a viewer. Hidden
    /// sessions are only shown to staff.
    pub async fn latest_session_for_viewer(
        &self,
        player: PlayerId,
        viewer_is_staff: bool,
    ) -> Result<Option<SessionRecord>, SessionError> {
        self.latest_session(player, !viewer_is_staff).await
    }
}

fn mark(transitions: &TransitionSet, player: PlayerId, entering: bool) {
    let mut set = transitions.lock().unwrap_or_else(PoisonError::into_inner);
    if entering {
        set.insert(player);
    } else {
        set.remove(&player);
    }
    tracing::debug!(%player, entering, "visibility transition marked");
}

/// Clears a player's transition marker when dropped.
///
/// Returned by [`SessionLifecycle::begin_transition`]. Dropping it on an
/// early return or a panic still clears the marker.
#[must_use = "the transition ends as soon as the guard is dropped"]
pub struct TransitionGuard {
    player: PlayerId,
    transitions: TransitionSet,
}

impl TransitionGuard {
    pub fn player(&self) -> PlayerId {
        self.player
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        mark(&self.transitions, self.player, false);
    }
}
