//! Persistence collaborator for note embeddings.
//!
//! The coordinator treats this purely as a key-addressable store; the real
//! implementation lives next to the relational schema, outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::PersistenceError;

/// A note row as the persistence layer returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    /// Text to embed (title plus body, pre-joined by the persistence layer).
    pub content: String,
}

impl NoteRecord {
    /// Creates a record.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Bookkeeping stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMetadata {
    /// Model that produced the vector.
    pub model: String,
    /// Vector dimension at write time.
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
}

/// A persisted vector, as [`EmbeddingStore::load_embeddings`] returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEmbedding {
    pub id: String,
    pub vector: Vec<f32>,
}

/// Key-addressable embedding persistence.
///
/// `save_embedding` overwrites silently; idempotent re-run semantics come
/// from the coordinator checking `has_embedding` first.
pub trait EmbeddingStore: Send + Sync {
    /// Returns `true` if a vector is already stored for `id`.
    fn has_embedding(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<bool, PersistenceError>> + Send;

    /// Stores (or replaces) the vector for `id`.
    fn save_embedding(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: EmbeddingMetadata,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;

    /// Fetches the note rows for `ids`; unknown ids are simply absent from
    /// the result.
    fn find_by_ids(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<NoteRecord>, PersistenceError>> + Send;

    /// Loads every persisted vector, for index rebuilds.
    fn load_embeddings(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<StoredEmbedding>, PersistenceError>> + Send;
}
