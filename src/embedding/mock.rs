//! In-memory [`EmbeddingStore`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::error::PersistenceError;
use super::store::{EmbeddingMetadata, EmbeddingStore, NoteRecord, StoredEmbedding};

/// Hash-map backed store with scriptable failures.
#[derive(Default)]
pub struct InMemoryEmbeddingStore {
    notes: RwLock<HashMap<String, NoteRecord>>,
    embeddings: RwLock<HashMap<String, (Vec<f32>, EmbeddingMetadata)>>,
    fail_saves: RwLock<HashSet<String>>,
    fail_reads: AtomicBool,
}

impl InMemoryEmbeddingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note row.
    pub fn insert_note(&self, note: NoteRecord) {
        self.notes.write().insert(note.id.clone(), note);
    }

    /// Number of persisted vectors.
    pub fn embedding_count(&self) -> usize {
        self.embeddings.read().len()
    }

    /// The persisted vector for `id`, if any.
    pub fn embedding(&self, id: &str) -> Option<Vec<f32>> {
        self.embeddings.read().get(id).map(|(v, _)| v.clone())
    }

    /// The persisted metadata for `id`, if any.
    pub fn metadata(&self, id: &str) -> Option<EmbeddingMetadata> {
        self.embeddings.read().get(id).map(|(_, m)| m.clone())
    }

    /// Makes `save_embedding` fail for `id` until cleared.
    pub fn fail_save_for(&self, id: &str) {
        self.fail_saves.write().insert(id.to_string());
    }

    /// Clears a scripted save failure.
    pub fn clear_fail_save(&self, id: &str) {
        self.fail_saves.write().remove(id);
    }

    /// Makes every read operation fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(PersistenceError::new("scripted read failure"))
        } else {
            Ok(())
        }
    }
}

impl EmbeddingStore for InMemoryEmbeddingStore {
    async fn has_embedding(&self, id: &str) -> Result<bool, PersistenceError> {
        self.check_reads()?;
        Ok(self.embeddings.read().contains_key(id))
    }

    async fn save_embedding(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: EmbeddingMetadata,
    ) -> Result<(), PersistenceError> {
        if self.fail_saves.read().contains(id) {
            return Err(PersistenceError::new(format!(
                "scripted save failure for '{id}'"
            )));
        }
        self.embeddings
            .write()
            .insert(id.to_string(), (vector, metadata));
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<NoteRecord>, PersistenceError> {
        self.check_reads()?;
        let notes = self.notes.read();
        Ok(ids.iter().filter_map(|id| notes.get(id).cloned()).collect())
    }

    async fn load_embeddings(&self) -> Result<Vec<StoredEmbedding>, PersistenceError> {
        self.check_reads()?;
        Ok(self
            .embeddings
            .read()
            .iter()
            .map(|(id, (vector, _))| StoredEmbedding {
                id: id.clone(),
                vector: vector.clone(),
            })
            .collect())
    }
}
