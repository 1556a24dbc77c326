//! Record types for Bailiff.
//!
//! This crate defines the values every other layer passes around:
//!
//! - **Identity** ([`PlayerId`], [`Target`]): who a record is about, and
//!   how a caller names them (stable key or display name).
//! - **Punishments** ([`Punishment`], [`PunishmentKind`], [`Pardon`]):
//!   one issued moderation action and its pardon metadata.
//! - **Sessions** ([`SessionRecord`]): one connect-to-disconnect interval.
//! - **Errors** ([`TypesError`]): what can go wrong when parsing these
//!   from text.
//!
//! # Architecture
//!
//! The types layer knows nothing about storage or connections. It only
//! knows what a record looks like and when it counts as "active".
//!
//! ```text
//! Store (persists records) → Types (this crate) ← Moderation / Session
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod punishment;
mod session;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::TypesError;
pub use punishment::{Pardon, Punishment, PunishmentId, PunishmentKind};
pub use session::{SessionId, SessionRecord};
pub use types::{PlayerId, Target};
