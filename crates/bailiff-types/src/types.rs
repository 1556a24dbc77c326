//! Identity types shared by every Bailiff layer.
//!
//! A player is always stored under a stable key ([`PlayerId`]). Humans,
//! however, refer to players by display name, so operations that accept
//! input from staff take a [`Target`] that may be either.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TypesError;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// The stable identity key of a player account.
///
/// A newtype over [`Uuid`] so a punishment ID or session ID can never be
/// passed where a player is expected. `#[serde(transparent)]` keeps the
/// JSON form a bare UUID string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random identity. Mostly useful in tests and demos;
    /// real identities come from the account service.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Longest display name the account service hands out.
const MAX_NAME_LEN: usize = 16;

/// How a caller refers to a player: by key, or by display name.
///
/// Names must be resolved to a [`PlayerId`] (through the identity service)
/// before anything can be looked up in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A stable identity key.
    Id(PlayerId),
    /// A display name that still needs resolving.
    Name(String),
}

impl Target {
    /// Returns the key directly if this target already is one.
    pub fn as_id(&self) -> Option<PlayerId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

impl From<PlayerId> for Target {
    fn from(id: PlayerId) -> Self {
        Self::Id(id)
    }
}

impl FromStr for Target {
    type Err = TypesError;

    /// Parses a UUID as [`Target::Id`]; otherwise accepts a display name
    /// of 1–16 ASCII letters, digits, or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(uuid) = Uuid::parse_str(s) {
            return Ok(Self::Id(PlayerId(uuid)));
        }
        if is_valid_name(s) {
            Ok(Self::Name(s.to_string()))
        } else {
            Err(TypesError::InvalidTarget(s.to_string()))
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

fn is_valid_name(s: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&s.len())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
