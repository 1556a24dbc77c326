//! Player session tracking for Bailiff.
//!
//! This crate records when each player was connected:
//!
//! 1. **Sessions**: one [`SessionRecord`](bailiff_types::SessionRecord)
//!    per genuine connect-to-disconnect interval ([`SessionLifecycle`])
//! 2. **Transition suppression**: hosts that fake a quit/join pair when a
//!    player toggles visibility mark the window ([`TransitionGuard`]), so
//!    neither this crate nor other listeners mistake it for a real one
//!
//! # How it fits in the stack
//!
//! ```text
//! Bailiff hub (above)  ← forwards connect / disconnect / visibility events
//!     ↕
//! Session layer (this crate)  ← open sessions, transition markers
//!     ↕
//! Store layer (below)  ← persisted session records
//! ```

mod config;
mod error;
mod lifecycle;

pub use config::SessionConfig;
pub use error::SessionError;
pub use lifecycle::{SessionLifecycle, TransitionGuard};
