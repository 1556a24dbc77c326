/// Errors that can occur in the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store cannot be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A write failed.
    #[error("write failed: {0}")]
    Write(String),
}
