//! Punishment resolution for Bailiff.
//!
//! Decides, on every connection attempt, whether a player may join, and
//! keeps the local mute cache in step with what storage says.
//!
//! # Key types
//!
//! - [`ResolutionEngine`]: the connection gate, plus the deferred
//!   re-check when storage is slow
//! - [`Coordinator`]: issue / pardon / unmute, keeping at most one active
//!   ban and one active mute per player and service
//! - [`MuteCache`]: who is muted right now, readable by chat gating
//! - [`Verdict`]: the pure "which punishments gate this player" stage
//! - [`IdentityResolver`], [`ConnectionGateway`], [`Scheduler`]: the
//!   collaborators the host plugs in
//!
//! # How it fits in the stack
//!
//! ```text
//! Bailiff hub (above)  ← forwards connect attempts and staff actions
//!     ↕
//! Moderation layer (this crate)  ← resolution, cache, coordination
//!     ↕
//! Store layer (below)  ← persisted punishment history
//! ```

mod cache;
mod config;
mod coordinator;
mod engine;
mod error;
mod gateway;
mod identity;
mod scheduler;
mod screen;
mod verdict;

pub use cache::MuteCache;
pub use config::ModerationConfig;
pub use coordinator::Coordinator;
pub use engine::{Decision, RecheckOutcome, RejectReason, ResolutionEngine};
pub use error::ModerationError;
pub use gateway::ConnectionGateway;
pub use identity::IdentityResolver;
pub use scheduler::{jittered, Scheduler, Task, TokioScheduler};
pub use screen::render_screen;
pub use verdict::Verdict;
