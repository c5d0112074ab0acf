use async_trait::async_trait;

use super::error::ProviderError;
use super::types::{AiRequest, AiResponse};

#[async_trait]
/// Capability every AI/embedding backend implements.
///
/// Implementations are registered with the dispatcher as
/// `Arc<dyn ProviderCapability>`. `probe` must be cheap: the dispatcher runs
/// it before every generation attempt, and a `false` skips the provider
/// without spending a generation call.
pub trait ProviderCapability: Send + Sync {
    /// Lightweight availability check.
    async fn probe(&self) -> bool;

    /// Generates a response for a single request.
    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError>;

    /// Generates one embedding vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}
