//! Error types for the types layer.
//!
//! Each crate in Bailiff defines its own error enum. A `TypesError` always
//! means some text could not be turned into one of our record types; it
//! never means storage or network trouble.

/// Errors that can occur while parsing record types from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// The string is neither a UUID nor a valid display name.
    ///
    /// Display names are 1–16 characters of ASCII letters, digits, or `_`.
    #[error("invalid target: {0:?}")]
    InvalidTarget(String),

    /// The string does not name a punishment kind
    /// (`KICK`, `WARN`, `MUTE`, `BAN`, `TEMP_BAN`).
    #[error("unknown punishment kind: {0:?}")]
    UnknownKind(String),
}
