//! Provider capability interface, request/response shapes and adapters.

pub mod capability;
pub mod error;
pub mod http;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use capability::ProviderCapability;
pub use error::ProviderError;
pub use http::{HttpProviderConfig, OpenAiHttpProvider};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
pub use types::{AiRequest, AiResponse, ProviderDescriptor, TokenUsage};
