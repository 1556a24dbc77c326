//! Session records: one connect-to-disconnect interval per row.
//!
//! ```text
//!   start() ──→ [open: ended_at = None] ──(end)──→ [closed]
//! ```
//!
//! A closed record is never reopened. The next connect writes a new one.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PlayerId;

/// Unique identifier of one session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,

    /// Whose session this is.
    pub player: PlayerId,

    pub started_at: DateTime<Utc>,

    /// `None` while the session is still open.
    pub ended_at: Option<DateTime<Utc>>,

    /// Whether the player was hidden from others when the session started.
    pub vanished: bool,
}

impl SessionRecord {
    /// Opens a new session record starting at `at`.
    pub fn start(player: PlayerId, vanished: bool, at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId(Uuid::new_v4()),
            player,
            started_at: at,
            ended_at: None,
            vanished,
        }
    }

    /// Returns `true` while the session has no end time.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Closes the session at `at`. A session that is already closed keeps
    /// its original end time.
    pub fn end(&mut self, at: DateTime<Utc>) {
        if self.ended_at.is_none() {
            self.ended_at = Some(at);
        }
    }

    /// Length of a closed session. `None` while still open.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.ended_at.map(|end| end - self.started_at)
    }
}
