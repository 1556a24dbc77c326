//! Punishment records.
//!
//! A punishment is written once when staff (or the system) issues it and
//! is never deleted. The only mutation it ever sees is a pardon, which flips
//! it inactive and records who lifted it and when.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PlayerId, TypesError};

// ---------------------------------------------------------------------------
// PunishmentId
// ---------------------------------------------------------------------------

/// Unique identifier of one punishment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PunishmentId(pub Uuid);

impl PunishmentId {
    /// Generates a fresh random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PunishmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PunishmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PunishmentKind
// ---------------------------------------------------------------------------

/// What kind of action a punishment is.
///
/// `Ban` and `TempBan` together form the "ban" category: anything that
/// gates a connection. `Mute` gates chat only. `Kick` and `Warn` are
/// one-shot and never stay active in any meaningful sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunishmentKind {
    Kick,
    Warn,
    Mute,
    Ban,
    TempBan,
}

impl PunishmentKind {
    /// Returns `true` for `Ban` and `TempBan`.
    pub fn is_ban(self) -> bool {
        matches!(self, Self::Ban | Self::TempBan)
    }

    /// Returns `true` if `self` and `other` supersede each other: both
    /// bans, or both mutes. Issuing one lifts any active one of the other.
    pub fn same_category(self, other: Self) -> bool {
        (self.is_ban() && other.is_ban()) || (self == Self::Mute && other == Self::Mute)
    }

    /// Human-readable verb used on punishment screens.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Kick => "kicked",
            Self::Warn => "warned",
            Self::Mute => "muted",
            Self::Ban => "permanently banned",
            Self::TempBan => "temporarily banned",
        }
    }
}

impl fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kick => write!(f, "KICK"),
            Self::Warn => write!(f, "WARN"),
            Self::Mute => write!(f, "MUTE"),
            Self::Ban => write!(f, "BAN"),
            Self::TempBan => write!(f, "TEMP_BAN"),
        }
    }
}

impl FromStr for PunishmentKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KICK" => Ok(Self::Kick),
            "WARN" => Ok(Self::Warn),
            "MUTE" => Ok(Self::Mute),
            "BAN" => Ok(Self::Ban),
            "TEMP_BAN" | "TEMPBAN" => Ok(Self::TempBan),
            _ => Err(TypesError::UnknownKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Pardon
// ---------------------------------------------------------------------------

/// Who lifted a punishment, and when. `by: None` means the console or an
/// automated system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pardon {
    pub by: Option<PlayerId>,
    pub at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Punishment
// ---------------------------------------------------------------------------

/// One issued punishment.
///
/// Fields other than `active` and `pardon` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punishment {
    pub id: PunishmentId,

    /// Who is being punished.
    pub target: PlayerId,

    /// Who issued it. `None` for system-issued punishments.
    pub issuer: Option<PlayerId>,

    pub kind: PunishmentKind,

    pub reason: String,

    pub issued_at: DateTime<Utc>,

    /// When the punishment lapses on its own. `None` means permanent.
    pub expires_at: Option<DateTime<Utc>>,

    /// Cleared by a pardon. Never set back once cleared.
    pub active: bool,

    /// Which logical service issued it. Only punishments whose tag matches
    /// the local deployment gate connections here.
    pub service: String,

    /// Silent punishments are not broadcast to other players.
    pub silent: bool,

    /// Set when the punishment was lifted early.
    pub pardon: Option<Pardon>,
}

impl Punishment {
    /// Creates an active, permanent, non-silent punishment issued now.
    ///
    /// Use the `with_*` methods to adjust expiry, issue time, or silence.
    pub fn new(
        kind: PunishmentKind,
        target: PlayerId,
        issuer: Option<PlayerId>,
        reason: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            id: PunishmentId::new(),
            target,
            issuer,
            kind,
            reason: reason.into(),
            issued_at: Utc::now(),
            expires_at: None,
            active: true,
            service: service.into(),
            silent: false,
            pardon: None,
        }
    }

    /// Sets when the punishment lapses.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the issue time (records imported from elsewhere keep theirs).
    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Marks the punishment as silent (not broadcast).
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Whether the punishment is in force at `now`: the active flag is set
    /// and it has either no expiry or an expiry strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expiry| expiry > now)
    }

    /// [`is_active_at`](Self::is_active_at) against the wall clock.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Returns `true` for bans and temp-bans.
    pub fn is_ban(&self) -> bool {
        self.kind.is_ban()
    }

    /// Case-insensitive service tag comparison.
    pub fn matches_service(&self, service: &str) -> bool {
        self.service.eq_ignore_ascii_case(service)
    }

    /// How long until the punishment lapses. `None` if it is permanent;
    /// zero if the expiry has already passed.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at
            .map(|expiry| (expiry - now).max(TimeDelta::zero()))
    }

    /// Lifts the punishment. Idempotent: pardoning twice keeps the first
    /// pardon's metadata.
    pub fn pardon(&mut self, by: Option<PlayerId>, at: DateTime<Utc>) {
        if self.pardon.is_none() {
            self.pardon = Some(Pardon { by, at });
        }
        self.active = false;
    }
}
