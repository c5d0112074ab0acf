//! The vector batch coordinator.
//!
//! Orchestrates batch embedding generation over a set of notes: filters out
//! already-embedded ids, sends the rest through the dispatcher in chunks,
//! persists each vector, and keeps the in-memory similarity index current.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::error::{EmbeddingError, PersistenceError};
use super::index::{SimilarMatch, SimilarityIndex};
use super::store::{EmbeddingMetadata, EmbeddingStore, NoteRecord};
use crate::constants::DEFAULT_EMBEDDING_CHUNK_SIZE;
use crate::dispatch::AiDispatcher;

/// Knobs for one [`VectorBatchCoordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Model name recorded in each vector's metadata.
    pub embedding_model: String,
    /// Notes per provider embedding call.
    pub chunk_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-3-small".to_string(),
            chunk_size: DEFAULT_EMBEDDING_CHUNK_SIZE,
        }
    }
}

/// Per-entity outcome of one batch run.
///
/// Every input id lands in exactly one of the three buckets. `skipped` ids
/// already had a stored vector, which is what makes re-running the same input
/// set a no-op.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchEmbeddingOutcome {
    pub successful: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedEmbedding>,
}

impl BatchEmbeddingOutcome {
    /// Returns `true` when no entity failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A failed entity and why.
#[derive(Debug, Clone, Serialize)]
pub struct FailedEmbedding {
    pub id: String,
    pub error: String,
}

/// Summary of an index rebuild.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RebuildReport {
    /// Vectors loaded into the index.
    pub indexed: usize,
    pub elapsed_ms: u64,
}

/// Orchestrates batch embedding generation over the dispatcher and the
/// persistence collaborator.
///
/// A note moves `unembedded → in-flight → embedded | failed` within one run;
/// failed notes are not recorded as processed, so the next run retries them.
pub struct VectorBatchCoordinator<S: EmbeddingStore> {
    dispatcher: Arc<AiDispatcher>,
    store: S,
    config: CoordinatorConfig,
    // Rebuilds take the write side for their whole duration; every embedding
    // write also takes the write side (it mutates the index), so writes queue
    // behind a rebuild instead of interleaving with it.
    index: RwLock<SimilarityIndex>,
}

impl<S: EmbeddingStore> VectorBatchCoordinator<S> {
    /// Creates a coordinator with an empty index.
    pub fn new(dispatcher: Arc<AiDispatcher>, store: S, config: CoordinatorConfig) -> Self {
        Self {
            dispatcher,
            store,
            config,
            index: RwLock::new(SimilarityIndex::new()),
        }
    }

    /// The persistence collaborator.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of vectors currently indexed.
    pub async fn index_len(&self) -> usize {
        self.index.read().await.len()
    }

    /// Embeds every not-yet-embedded note in `ids`.
    ///
    /// Already-embedded ids are skipped before any provider call, unknown ids
    /// and per-entity persistence failures become `failed` entries, and
    /// neither aborts the remaining items. Only a failure of the initial
    /// `find_by_ids` lookup fails the whole operation.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn generate_batch_embeddings(
        &self,
        ids: &[String],
    ) -> Result<BatchEmbeddingOutcome, EmbeddingError> {
        let mut outcome = BatchEmbeddingOutcome::default();
        if ids.is_empty() {
            return Ok(outcome);
        }

        let notes = self.store.find_by_ids(ids).await?;
        let notes_by_id: HashMap<&str, &NoteRecord> =
            notes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut pending: Vec<&NoteRecord> = Vec::new();
        for id in ids {
            let Some(note) = notes_by_id.get(id.as_str()) else {
                outcome.failed.push(FailedEmbedding {
                    id: id.clone(),
                    error: "entity not found".to_string(),
                });
                continue;
            };
            match self.store.has_embedding(id).await {
                Ok(true) => {
                    debug!(entity = %id, "already embedded, skipping");
                    outcome.skipped.push(id.clone());
                }
                Ok(false) => pending.push(*note),
                Err(persistence_error) => {
                    warn!(entity = %id, error = %persistence_error, "embedding lookup failed");
                    outcome.failed.push(FailedEmbedding {
                        id: id.clone(),
                        error: persistence_error.to_string(),
                    });
                }
            }
        }

        for chunk in pending.chunks(self.config.chunk_size.max(1)) {
            let texts: Vec<String> = chunk.iter().map(|n| n.content.clone()).collect();
            let vectors = match self.dispatcher.execute_embeddings(&texts).await {
                Ok(vectors) => vectors,
                Err(dispatch_error) => {
                    warn!(
                        chunk_len = chunk.len(),
                        error = %dispatch_error,
                        "embedding chunk failed"
                    );
                    for note in chunk {
                        outcome.failed.push(FailedEmbedding {
                            id: note.id.clone(),
                            error: dispatch_error.to_string(),
                        });
                    }
                    continue;
                }
            };

            for (note, vector) in chunk.iter().zip(vectors) {
                match self.persist(note, vector).await {
                    Ok(()) => outcome.successful.push(note.id.clone()),
                    Err(persistence_error) => {
                        warn!(
                            entity = %note.id,
                            error = %persistence_error,
                            "failed to persist embedding"
                        );
                        outcome.failed.push(FailedEmbedding {
                            id: note.id.clone(),
                            error: persistence_error.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            successful = outcome.successful.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            "batch embedding run finished"
        );
        Ok(outcome)
    }

    /// Recomputes the similarity index from persisted vectors.
    ///
    /// Holds the index write lock for the whole pass, so concurrent embedding
    /// writes queue until the rebuild finishes.
    #[instrument(skip(self))]
    pub async fn rebuild_index(&self) -> Result<RebuildReport, EmbeddingError> {
        let started = Instant::now();
        let mut index = self.index.write().await;

        let stored = self.store.load_embeddings().await?;
        let indexed = stored.len();
        index.rebuild(stored);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(indexed, elapsed_ms, "similarity index rebuilt");
        Ok(RebuildReport {
            indexed,
            elapsed_ms,
        })
    }

    /// Embeds `query` and returns the `top_k` closest indexed notes.
    pub async fn search_similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SimilarMatch>, EmbeddingError> {
        let vectors = self
            .dispatcher
            .execute_embeddings(&[query.to_string()])
            .await?;
        let query_vector = vectors.into_iter().next().unwrap_or_default();
        Ok(self.index.read().await.search(&query_vector, top_k))
    }

    async fn persist(&self, note: &NoteRecord, vector: Vec<f32>) -> Result<(), PersistenceError> {
        let mut index = self.index.write().await;
        let metadata = EmbeddingMetadata {
            model: self.config.embedding_model.clone(),
            dimension: vector.len(),
            created_at: Utc::now(),
        };
        self.store
            .save_embedding(&note.id, vector.clone(), metadata)
            .await?;
        index.insert(note.id.clone(), vector);
        Ok(())
    }
}

impl<S: EmbeddingStore> std::fmt::Debug for VectorBatchCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorBatchCoordinator")
            .field("model", &self.config.embedding_model)
            .field("chunk_size", &self.config.chunk_size)
            .finish()
    }
}
