//! Whole-deployment configuration.

use bailiff_moderation::ModerationConfig;
use bailiff_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::BailiffError;

/// Configuration for every layer, loadable from one JSON document.
///
/// Sections and fields may be omitted; they fall back to defaults.
///
/// ```json
/// {
///   "moderation": { "service": "core", "login_timeout_secs": 3 },
///   "sessions": { "enabled": true }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BailiffConfig {
    pub moderation: ModerationConfig,
    pub sessions: SessionConfig,
}

impl BailiffConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    /// [`BailiffError::Config`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, BailiffError> {
        Ok(serde_json::from_str(json)?)
    }
}
