use super::mock::MockProvider;
use super::types::{AiRequest, ProviderDescriptor};
use super::ProviderCapability;

#[test]
fn test_request_validity() {
    assert!(AiRequest::new("Summarize this note").is_valid());
    assert!(!AiRequest::new("").is_valid());
    assert!(!AiRequest::new("   \n\t").is_valid());
}

#[test]
fn test_request_builder_fields() {
    let request = AiRequest::new("Classify me")
        .with_context("work notebook")
        .with_max_length(128)
        .with_temperature(0.3);

    assert_eq!(request.context.as_deref(), Some("work notebook"));
    assert_eq!(request.max_length, Some(128));
    assert_eq!(request.temperature, Some(0.3));
    assert!(!request.include_metadata);
}

#[test]
fn test_request_json_round_trip() {
    let request = AiRequest::new("hello").with_max_length(64);
    let json = serde_json::to_string(&request).unwrap();
    let back: AiRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(request, back);
}

#[test]
fn test_request_deserializes_with_defaults() {
    let request: AiRequest = serde_json::from_str(r#"{"content": "just text"}"#).unwrap();
    assert_eq!(request.content, "just text");
    assert!(request.context.is_none());
    assert!(!request.include_metadata);
}

#[test]
fn test_descriptor_builders() {
    let descriptor = ProviderDescriptor::new("openai", 0);
    assert!(descriptor.enabled);
    assert!(descriptor.fallback_enabled);

    let disabled = ProviderDescriptor::new("claude", 1).disabled();
    assert!(!disabled.enabled);

    let no_fallback = ProviderDescriptor::new("local", 2).without_fallback();
    assert!(!no_fallback.fallback_enabled);
}

#[tokio::test]
async fn test_mock_provider_happy_path() {
    let provider = MockProvider::new("mock");

    assert!(provider.probe().await);

    let response = provider.generate(&AiRequest::new("hello world")).await.unwrap();
    assert_eq!(response.provider, "mock");
    assert!(response.content.contains("hello world"));
    assert_eq!(response.tokens_used.unwrap().input, 2);

    assert_eq!(provider.probe_count(), 1);
    assert_eq!(provider.generate_count(), 1);
}

#[tokio::test]
async fn test_mock_provider_metadata_fields() {
    let provider = MockProvider::new("mock");

    let mut request = AiRequest::new("tag this");
    request.include_metadata = true;

    let response = provider.generate(&request).await.unwrap();
    assert_eq!(response.category.as_deref(), Some("note"));
    assert!(response.tags.is_some());
}

#[tokio::test]
async fn test_mock_provider_scripted_failures() {
    let provider = MockProvider::new("mock").failing();

    let error = provider.generate(&AiRequest::new("x")).await.unwrap_err();
    assert_eq!(error.provider(), "mock");
    assert!(error.is_retryable());

    provider.set_fail_generation(false);
    provider.set_fail_marker(Some("poison"));
    assert!(provider.generate(&AiRequest::new("clean")).await.is_ok());
    assert!(provider.generate(&AiRequest::new("poison pill")).await.is_err());
}

#[tokio::test]
async fn test_mock_embeddings_are_deterministic_and_ordered() {
    let provider = MockProvider::new("mock").with_embedding_dim(16);

    let texts = vec!["first note".to_string(), "second note".to_string()];
    let a = provider.embed(&texts).await.unwrap();
    let b = provider.embed(&texts).await.unwrap();

    assert_eq!(a.len(), 2);
    assert_eq!(a[0].len(), 16);
    assert_eq!(a, b);
    assert_ne!(a[0], a[1]);
}
