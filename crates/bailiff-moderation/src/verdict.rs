//! Which of a player's punishments gate them here, right now.
//!
//! This is the pure middle stage of resolution: no storage, no cache, no
//! clock of its own. Feed it a history and a service tag, get back the ban
//! (if any) that rejects the connection and the mute (if any) that gates
//! chat.

use bailiff_types::{Punishment, PunishmentKind};
use chrono::{DateTime, Utc};

/// Outcome of assessing a punishment history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// An active, service-matched ban or temp-ban.
    pub ban: Option<Punishment>,
    /// An active, service-matched mute.
    pub mute: Option<Punishment>,
}

impl Verdict {
    /// Picks the gating punishments out of `history`.
    ///
    /// A record gates only if it is active at `now` and its service tag
    /// matches `service`. Records from other services stay in the history
    /// but are ignored here.
    ///
    /// When several bans (or mutes) qualify, the first one in `history`
    /// wins. No severity ordering is applied.
    pub fn assess(
        history: &[Punishment],
        service: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let gating = history
            .iter()
            .filter(|p| p.is_active_at(now) && p.matches_service(service));

        let mut verdict = Self::default();
        for p in gating {
            if verdict.ban.is_none() && p.is_ban() {
                verdict.ban = Some(p.clone());
            } else if verdict.mute.is_none() && p.kind == PunishmentKind::Mute {
                verdict.mute = Some(p.clone());
            }
            if verdict.ban.is_some() && verdict.mute.is_some() {
                break;
            }
        }
        verdict
    }

    /// Returns `true` if nothing gates the player.
    pub fn is_clean(&self) -> bool {
        self.ban.is_none() && self.mute.is_none()
    }
}
