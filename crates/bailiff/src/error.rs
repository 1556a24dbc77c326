//! Unified error type for Bailiff.

use bailiff_moderation::ModerationError;
use bailiff_session::SessionError;
use bailiff_store::StoreError;
use bailiff_types::TypesError;

/// Top-level error wrapping the error type of every layer.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BailiffError {
    /// A target or kind could not be parsed from text.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Storage failed outside the moderation or session layers.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Issuing, pardoning, or querying punishments failed.
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    /// Opening or closing a session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_types_error() {
        let err = TypesError::InvalidTarget("??".into());
        let bailiff_err: BailiffError = err.into();
        assert!(matches!(bailiff_err, BailiffError::Types(_)));
        assert!(bailiff_err.to_string().contains("??"));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Unavailable("down".into());
        let bailiff_err: BailiffError = err.into();
        assert!(matches!(bailiff_err, BailiffError::Store(_)));
    }

    #[test]
    fn test_from_moderation_error() {
        let err = ModerationError::IdentityNotFound("Ghost".into());
        let bailiff_err: BailiffError = err.into();
        assert!(matches!(bailiff_err, BailiffError::Moderation(_)));
        assert!(bailiff_err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_from_session_error() {
        let bailiff_err: BailiffError = SessionError::ShutDown.into();
        assert!(matches!(bailiff_err, BailiffError::Session(_)));
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let bailiff_err: BailiffError = err.into();
        assert!(matches!(bailiff_err, BailiffError::Config(_)));
    }
}
