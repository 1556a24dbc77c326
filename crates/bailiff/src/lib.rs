//! # Bailiff
//!
//! Punishment resolution and session tracking for multiplayer game servers.
//!
//! A host forwards its connection events to one [`Bailiff`] hub. The hub
//! answers whether a connecting player is banned (without ever stalling the
//! handshake on slow storage), keeps a local cache of who is muted, and
//! records play sessions while ignoring the fake quit/join pairs a
//! visibility toggle produces.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bailiff::prelude::*;
//!
//! bailiff::init_tracing();
//! let bailiff = Bailiff::builder()
//!     .service("core")
//!     .build(MemoryStore::new(), my_resolver, my_gateway);
//!
//! match bailiff.on_pre_login(player).await {
//!     Decision::Reject { message, .. } => disconnect(player, message),
//!     _ => bailiff.on_join(player, false).await?,
//! }
//! ```

mod config;
mod error;
mod hub;

pub use config::BailiffConfig;
pub use error::BailiffError;
pub use hub::{Bailiff, BailiffBuilder};

pub use bailiff_moderation as moderation;
pub use bailiff_session as session;
pub use bailiff_store as store;
pub use bailiff_types as types;

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it again, or after another subscriber was installed, does
/// nothing.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::{Bailiff, BailiffBuilder, BailiffConfig, BailiffError};
    pub use bailiff_moderation::{
        ConnectionGateway, Decision, IdentityResolver, ModerationConfig, RecheckOutcome,
        RejectReason, Scheduler, TokioScheduler,
    };
    pub use bailiff_session::{SessionConfig, TransitionGuard};
    pub use bailiff_store::{MemoryStore, PunishmentStore, SessionStore, StoreError};
    pub use bailiff_types::{
        PlayerId, Punishment, PunishmentId, PunishmentKind, SessionRecord, Target,
    };
}
