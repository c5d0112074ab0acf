use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while loading or validating configuration.
pub enum ConfigError {
    /// An environment variable held a non-numeric value.
    #[error("invalid value for {var}: '{value}'")]
    InvalidInteger {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// An unknown eviction strategy name.
    #[error("unknown cache strategy '{value}' (expected lru, fifo or lfu)")]
    UnknownStrategy {
        /// Offending value.
        value: String,
    },

    /// A provider list entry could not be parsed.
    #[error("invalid provider spec '{value}': {reason}")]
    InvalidProviderSpec {
        /// Offending list entry.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A limit that must be positive was zero.
    #[error("{name} must be at least 1")]
    LimitTooSmall {
        /// Limit name.
        name: &'static str,
    },
}
