//! Moderation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the connection gate and punishment screens.
///
/// `#[serde(default)]` lets a config file name only the fields it wants to
/// override; everything else falls back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Service tag of this deployment. Only punishments carrying this tag
    /// (case-insensitive) gate connections here.
    pub service: String,

    /// How long (in seconds) the connection gate waits for punishment
    /// history before letting the player in provisionally.
    ///
    /// Default: 5 seconds.
    pub login_timeout_secs: u64,

    /// Delay (in milliseconds) before the deferred re-check runs after a
    /// provisional accept. Default: 1000.
    pub recheck_delay_ms: u64,

    /// Upper bound (in milliseconds) of random jitter added to the
    /// re-check delay, so a burst of players admitted during one storage
    /// stall don't all hit storage again at the same instant.
    /// Default: 250.
    pub recheck_jitter_ms: u64,

    /// Name shown on punishment screens ("banned from ...").
    pub server_name: String,

    /// Where banned players can appeal. Omitted from screens when `None`.
    pub appeal_link: Option<String>,

    /// Display name used for system-issued punishments.
    pub console_name: String,

    /// Shown to players rejected because storage failed.
    pub error_message: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            service: "global".to_string(),
            login_timeout_secs: 5,
            recheck_delay_ms: 1_000,
            recheck_jitter_ms: 250,
            server_name: "the server".to_string(),
            appeal_link: None,
            console_name: "Console".to_string(),
            error_message: "Error joining, please try again.".to_string(),
        }
    }
}

impl ModerationConfig {
    /// Defaults with the given service tag.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Default::default()
        }
    }

    /// Fix any values that would make the gate misbehave.
    ///
    /// - An empty `service` falls back to `"global"`.
    /// - `login_timeout_secs` of 0 would reject nobody and defer everybody;
    ///   it is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.service.trim().is_empty() {
            tracing::warn!("empty service tag: falling back to \"global\"");
            self.service = "global".to_string();
        }
        if self.login_timeout_secs == 0 {
            tracing::warn!("login_timeout_secs is 0: raising to 1");
            self.login_timeout_secs = 1;
        }
        self
    }

    /// The connection gate's fetch bound.
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// Base delay of the deferred re-check (before jitter).
    pub fn recheck_delay(&self) -> Duration {
        Duration::from_millis(self.recheck_delay_ms)
    }

    /// Maximum jitter added to the re-check delay.
    pub fn recheck_jitter(&self) -> Duration {
        Duration::from_millis(self.recheck_jitter_ms)
    }
}
