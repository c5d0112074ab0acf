//! Typed shapes exchanged with providers and the HTTP layer.

use serde::{Deserialize, Serialize};

/// A single generation request.
///
/// `content` is the text to operate on and must be non-empty; see
/// [`AiRequest::is_valid`]. The optional fields tune the provider call and
/// participate in result memoization (except `include_metadata`, which only
/// shapes the response envelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub include_metadata: bool,
}

impl AiRequest {
    /// Creates a request with just content; everything else defaults.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            context: None,
            max_length: None,
            temperature: None,
            include_metadata: false,
        }
    }

    /// Attaches caller context (e.g. the notebook a note belongs to).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Caps the response length in tokens.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns `true` when the request carries non-blank content.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Token accounting reported by a provider for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

/// A provider's answer to an [`AiRequest`].
///
/// `provider` always names the backend that actually produced the response,
/// which may differ from the requested primary when fallback kicked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub response_time_ms: u64,
}

/// Registry entry describing one provider's place in the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider id; the registry holds at most one entry per id.
    pub id: String,
    /// Chain position, lower is tried first.
    pub priority: i32,
    /// Disabled providers are never tried.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether this provider may serve as a fallback for others. The resolved
    /// primary is always tried regardless of this flag.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ProviderDescriptor {
    /// Creates an enabled, fallback-eligible descriptor.
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
            enabled: true,
            fallback_enabled: true,
        }
    }

    /// Marks the provider disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Excludes the provider from fallback duty.
    pub fn without_fallback(mut self) -> Self {
        self.fallback_enabled = false;
        self
    }
}
