use thiserror::Error;

/// Failures reported by a [`crate::VotingStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record stored under {0}")]
    NotFound(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected by storage backend: {0}")]
    WriteFailed(String),
}
