use thiserror::Error;

#[derive(Debug, Error)]
/// Failure of a single provider call.
///
/// The dispatcher catches these, logs them with the provider id, and moves on
/// to the next provider in the fallback chain; see
/// [`is_retryable`](ProviderError::is_retryable) for the classification.
pub enum ProviderError {
    /// The availability probe failed or the backend reported itself down.
    #[error("provider '{provider}' is unavailable: {message}")]
    Unavailable {
        /// Provider id.
        provider: String,
        /// Why it is considered down.
        message: String,
    },

    /// The call exceeded its upper-bound timeout.
    #[error("provider '{provider}' timed out after {elapsed_ms}ms")]
    Timeout {
        /// Provider id.
        provider: String,
        /// Time spent before giving up.
        elapsed_ms: u64,
    },

    /// The upstream rate limit rejected the call.
    #[error("provider '{provider}' rate limited the request")]
    RateLimited {
        /// Provider id.
        provider: String,
    },

    /// Transport-level failure (connect, TLS, I/O).
    #[error("transport error talking to '{provider}': {message}")]
    Transport {
        /// Provider id.
        provider: String,
        /// Error message.
        message: String,
    },

    /// Credentials were rejected.
    #[error("provider '{provider}' rejected credentials")]
    Auth {
        /// Provider id.
        provider: String,
    },

    /// The provider rejected the request as malformed before generating.
    #[error("provider '{provider}' rejected the request: {message}")]
    InvalidRequest {
        /// Provider id.
        provider: String,
        /// Rejection detail.
        message: String,
    },

    /// The backend answered with a payload we could not interpret.
    #[error("unexpected response from '{provider}': {message}")]
    InvalidResponse {
        /// Provider id.
        provider: String,
        /// Parse/shape detail.
        message: String,
    },
}

impl ProviderError {
    /// The provider id this error originated from.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Unavailable { provider, .. }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::RateLimited { provider }
            | ProviderError::Transport { provider, .. }
            | ProviderError::Auth { provider }
            | ProviderError::InvalidRequest { provider, .. }
            | ProviderError::InvalidResponse { provider, .. } => provider,
        }
    }

    /// Classifies the failure: retryable errors are transient conditions of
    /// one backend; terminal ones indicate the request or credentials would
    /// fail the same way anywhere.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Unavailable { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::RateLimited { .. }
                | ProviderError::Transport { .. }
        )
    }
}
