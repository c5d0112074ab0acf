//! Batch embedding generation and the in-memory similarity index.

pub mod coordinator;
pub mod error;
pub mod index;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use coordinator::{
    BatchEmbeddingOutcome, CoordinatorConfig, FailedEmbedding, RebuildReport,
    VectorBatchCoordinator,
};
pub use error::{EmbeddingError, PersistenceError};
pub use index::{cosine_similarity, SimilarMatch, SimilarityIndex};
#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryEmbeddingStore;
pub use store::{EmbeddingMetadata, EmbeddingStore, NoteRecord, StoredEmbedding};
