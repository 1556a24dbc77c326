//! Session tracking configuration.

use serde::{Deserialize, Serialize};

/// Configuration for session tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether connect / disconnect events open and close sessions at all.
    /// When `false` the event handlers do nothing; transition markers still
    /// work.
    ///
    /// Default: `true`.
    pub enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
