use thiserror::Error;

#[derive(Debug, Error)]
/// Whole-operation dispatch failures.
///
/// Per-provider and per-batch-item failures are not represented here: the
/// former are consumed by the fallback chain, the latter are recorded in the
/// result sequence.
pub enum DispatchError {
    /// Every enabled provider was tried and none produced a response.
    #[error("all providers unavailable after trying {attempted} provider(s)")]
    AllProvidersUnavailable {
        /// How many providers were in the chain.
        attempted: usize,
    },

    /// Batch rejected before any provider call: too many requests.
    #[error("batch of {size} requests exceeds the configured maximum of {max}")]
    BatchTooLarge {
        /// Requested batch size.
        size: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// Batch rejected before any provider call: concurrency above the cap.
    #[error("requested concurrency {requested} exceeds the configured maximum of {max}")]
    ConcurrencyTooHigh {
        /// Requested window width.
        requested: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// Batch rejected before any provider call: a parallel job needs at least
    /// one concurrent slot.
    #[error("batch concurrency must be at least 1")]
    ZeroConcurrency,
}

impl DispatchError {
    /// Returns `true` for admission-control rejections, which are guaranteed
    /// to have cost nothing upstream.
    pub fn is_admission_rejection(&self) -> bool {
        matches!(
            self,
            DispatchError::BatchTooLarge { .. }
                | DispatchError::ConcurrencyTooHigh { .. }
                | DispatchError::ZeroConcurrency
        )
    }
}
