//! In-memory cosine similarity index over persisted note vectors.

use serde::Serialize;

use super::store::StoredEmbedding;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMatch {
    pub id: String,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

struct IndexedVector {
    id: String,
    vector: Vec<f32>,
    norm: f32,
}

/// Flat cosine index. Linear scan is plenty for a single user's notes; the
/// coordinator guards all mutation behind its rebuild lock.
#[derive(Default)]
pub struct SimilarityIndex {
    entries: Vec<IndexedVector>,
}

impl SimilarityIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed vectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces the vector for `id`.
    pub fn insert(&mut self, id: String, vector: Vec<f32>) {
        let norm = norm(&vector);
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.vector = vector;
                entry.norm = norm;
            }
            None => self.entries.push(IndexedVector { id, vector, norm }),
        }
    }

    /// Removes the vector for `id`, returning `true` if it was indexed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drops everything and re-indexes from persisted vectors.
    pub fn rebuild(&mut self, stored: Vec<StoredEmbedding>) {
        self.entries.clear();
        self.entries.reserve(stored.len());
        for embedding in stored {
            let norm = norm(&embedding.vector);
            self.entries.push(IndexedVector {
                id: embedding.id,
                vector: embedding.vector,
                norm,
            });
        }
    }

    /// Returns the `top_k` most similar entries, best first.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SimilarMatch> {
        if top_k == 0 || query.is_empty() {
            return Vec::new();
        }

        let query_norm = norm(query);
        let mut matches: Vec<SimilarMatch> = self
            .entries
            .iter()
            .filter(|e| e.vector.len() == query.len())
            .map(|e| SimilarMatch {
                id: e.id.clone(),
                score: dot(&e.vector, query) / (e.norm * query_norm).max(f32::EPSILON),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        matches
    }
}

impl std::fmt::Debug for SimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Cosine similarity of two equal-length vectors; 0 on mismatch or a zero
/// vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let denominator = norm(a) * norm(b);
    if denominator <= f32::EPSILON {
        return 0.0;
    }
    dot(a, b) / denominator
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}
