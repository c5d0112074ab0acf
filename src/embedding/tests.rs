use std::sync::Arc;
use std::time::Duration;

use super::coordinator::{CoordinatorConfig, VectorBatchCoordinator};
use super::index::{cosine_similarity, SimilarityIndex};
use super::mock::InMemoryEmbeddingStore;
use super::store::{NoteRecord, StoredEmbedding};
use crate::dispatch::{AiDispatcher, DispatcherConfig};
use crate::provider::{MockProvider, ProviderCapability, ProviderDescriptor};

fn dispatcher_with_provider() -> (Arc<AiDispatcher>, Arc<MockProvider>) {
    let dispatcher = Arc::new(AiDispatcher::new(DispatcherConfig {
        inter_batch_delay: Duration::ZERO,
        ..DispatcherConfig::default()
    }));
    let provider = Arc::new(MockProvider::new("embedder"));
    dispatcher.register_provider(
        ProviderDescriptor::new("embedder", 0),
        Arc::clone(&provider) as Arc<dyn ProviderCapability>,
    );
    (dispatcher, provider)
}

fn coordinator_with(
    notes: &[(&str, &str)],
) -> (
    VectorBatchCoordinator<InMemoryEmbeddingStore>,
    Arc<MockProvider>,
) {
    let (dispatcher, provider) = dispatcher_with_provider();
    let store = InMemoryEmbeddingStore::new();
    for (id, content) in notes {
        store.insert_note(NoteRecord::new(*id, *content));
    }
    (
        VectorBatchCoordinator::new(dispatcher, store, CoordinatorConfig::default()),
        provider,
    )
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_batch_embeds_all_new_notes() {
    let (coordinator, provider) =
        coordinator_with(&[("a", "grocery list"), ("b", "meeting agenda")]);

    let outcome = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(outcome.successful, vec!["a".to_string(), "b".to_string()]);
    assert!(outcome.skipped.is_empty());
    assert!(outcome.failed.is_empty());
    assert!(outcome.is_complete());
    assert_eq!(coordinator.store().embedding_count(), 2);
    assert_eq!(provider.embed_count(), 1);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let (coordinator, provider) =
        coordinator_with(&[("a", "grocery list"), ("b", "meeting agenda")]);

    let first = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();
    assert_eq!(first.successful.len(), 2);

    let second = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    assert!(second.successful.is_empty());
    assert_eq!(second.skipped, vec!["a".to_string(), "b".to_string()]);
    assert!(second.failed.is_empty());
    // no provider call was spent on the second run
    assert_eq!(provider.embed_count(), 1);
}

#[tokio::test]
async fn test_unknown_id_fails_without_aborting_siblings() {
    let (coordinator, _) = coordinator_with(&[("a", "grocery list")]);

    let outcome = coordinator
        .generate_batch_embeddings(&ids(&["a", "ghost"]))
        .await
        .unwrap();

    assert_eq!(outcome.successful, vec!["a".to_string()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "ghost");
    assert!(outcome.failed[0].error.contains("not found"));
}

#[tokio::test]
async fn test_persistence_failure_is_recorded_and_retryable() {
    let (coordinator, _) = coordinator_with(&[("a", "alpha"), ("b", "beta")]);
    coordinator.store().fail_save_for("b");

    let outcome = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(outcome.successful, vec!["a".to_string()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "b");
    assert_eq!(coordinator.store().embedding_count(), 1);

    // the failed entity was not marked processed, so a later run retries it
    coordinator.store().clear_fail_save("b");
    let retry = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(retry.skipped, vec!["a".to_string()]);
    assert_eq!(retry.successful, vec!["b".to_string()]);
    assert_eq!(coordinator.store().embedding_count(), 2);
}

#[tokio::test]
async fn test_dispatcher_failure_fails_chunk_entities_only() {
    let (coordinator, provider) = coordinator_with(&[("a", "alpha"), ("b", "beta")]);
    provider.set_fail_embedding(true);

    let outcome = coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    assert!(outcome.successful.is_empty());
    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(coordinator.store().embedding_count(), 0);
}

#[tokio::test]
async fn test_lookup_failure_fails_whole_operation() {
    let (coordinator, _) = coordinator_with(&[("a", "alpha")]);
    coordinator.store().set_fail_reads(true);

    let result = coordinator.generate_batch_embeddings(&ids(&["a"])).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_input_is_a_no_op() {
    let (coordinator, provider) = coordinator_with(&[]);

    let outcome = coordinator.generate_batch_embeddings(&[]).await.unwrap();

    assert!(outcome.successful.is_empty());
    assert!(outcome.skipped.is_empty());
    assert!(outcome.failed.is_empty());
    assert_eq!(provider.embed_count(), 0);
}

#[tokio::test]
async fn test_chunking_splits_provider_calls() {
    let notes: Vec<(String, String)> = (0..5)
        .map(|i| (format!("n{i}"), format!("note number {i}")))
        .collect();
    let note_refs: Vec<(&str, &str)> = notes
        .iter()
        .map(|(id, content)| (id.as_str(), content.as_str()))
        .collect();
    let (dispatcher, provider) = dispatcher_with_provider();
    let store = InMemoryEmbeddingStore::new();
    for (id, content) in &note_refs {
        store.insert_note(NoteRecord::new(*id, *content));
    }
    let coordinator = VectorBatchCoordinator::new(
        dispatcher,
        store,
        CoordinatorConfig {
            chunk_size: 2,
            ..CoordinatorConfig::default()
        },
    );

    let all_ids: Vec<String> = (0..5).map(|i| format!("n{i}")).collect();
    let outcome = coordinator
        .generate_batch_embeddings(&all_ids)
        .await
        .unwrap();

    assert_eq!(outcome.successful.len(), 5);
    // 5 notes in chunks of 2 → 3 provider calls
    assert_eq!(provider.embed_count(), 3);
}

#[tokio::test]
async fn test_rebuild_index_loads_persisted_vectors() {
    let (coordinator, _) = coordinator_with(&[("a", "alpha"), ("b", "beta")]);

    coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();
    assert_eq!(coordinator.index_len().await, 2);

    let report = coordinator.rebuild_index().await.unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(coordinator.index_len().await, 2);
}

#[tokio::test]
async fn test_search_similar_finds_identical_text_first() {
    let (coordinator, _) = coordinator_with(&[
        ("a", "quarterly budget review"),
        ("b", "banana bread recipe"),
    ]);

    coordinator
        .generate_batch_embeddings(&ids(&["a", "b"]))
        .await
        .unwrap();

    let matches = coordinator
        .search_similar("quarterly budget review", 2)
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    // the mock embedder is deterministic, so identical text scores 1.0
    assert_eq!(matches[0].id, "a");
    assert!(matches[0].score > 0.999);
}

#[tokio::test]
async fn test_metadata_records_model_and_dimension() {
    let (coordinator, _) = coordinator_with(&[("a", "alpha")]);

    coordinator
        .generate_batch_embeddings(&ids(&["a"]))
        .await
        .unwrap();

    let metadata = coordinator.store().metadata("a").unwrap();
    assert_eq!(metadata.model, "text-embedding-3-small");
    assert_eq!(metadata.dimension, 8);
}

#[test]
fn test_cosine_similarity_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
}

#[test]
fn test_similarity_index_insert_replace_remove() {
    let mut index = SimilarityIndex::new();
    index.insert("a".to_string(), vec![1.0, 0.0]);
    index.insert("b".to_string(), vec![0.0, 1.0]);
    assert_eq!(index.len(), 2);

    // replacing keeps one entry per id
    index.insert("a".to_string(), vec![0.5, 0.5]);
    assert_eq!(index.len(), 2);

    assert!(index.remove("a"));
    assert!(!index.remove("a"));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_similarity_index_search_orders_by_score() {
    let mut index = SimilarityIndex::new();
    index.insert("x".to_string(), vec![1.0, 0.0]);
    index.insert("y".to_string(), vec![0.7, 0.7]);
    index.insert("z".to_string(), vec![0.0, 1.0]);

    let matches = index.search(&[1.0, 0.0], 2);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "x");
    assert_eq!(matches[1].id, "y");
}

#[test]
fn test_similarity_index_rebuild_replaces_contents() {
    let mut index = SimilarityIndex::new();
    index.insert("old".to_string(), vec![1.0, 0.0]);

    index.rebuild(vec![
        StoredEmbedding {
            id: "n1".to_string(),
            vector: vec![0.0, 1.0],
        },
        StoredEmbedding {
            id: "n2".to_string(),
            vector: vec![1.0, 1.0],
        },
    ]);

    assert_eq!(index.len(), 2);
    assert!(index.search(&[1.0, 0.0], 10).iter().all(|m| m.id != "old"));
}
