use thiserror::Error;

use crate::dispatch::DispatchError;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, Error)]
#[error("persistence failure: {message}")]
pub struct PersistenceError {
    /// Backend detail, suitable for logs.
    pub message: String,
}

impl PersistenceError {
    /// Creates an error from a backend message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
/// Whole-operation failures of the vector batch coordinator.
///
/// Per-entity failures never surface here; they are recorded in the
/// [`BatchEmbeddingOutcome`](super::BatchEmbeddingOutcome) instead.
pub enum EmbeddingError {
    /// A persistence read the whole operation depends on failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The dispatcher could not serve the operation at all.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
