//! Batch job shapes and per-item results.

use serde::{Deserialize, Serialize};

use crate::provider::{AiRequest, AiResponse};

/// How a batch schedules its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStrategy {
    /// Fixed-size concurrent windows with a pacing delay between them.
    Parallel,
    /// Strictly one request at a time.
    Sequential,
}

/// An ordered batch of generation requests.
///
/// The result of executing a job is a same-length sequence of
/// [`BatchItemResult`] aligned positionally with `requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub requests: Vec<AiRequest>,
    pub strategy: BatchStrategy,
    /// Window width for [`BatchStrategy::Parallel`]; ignored for sequential
    /// jobs.
    pub max_concurrency: usize,
}

impl BatchJob {
    /// A parallel job with the given window width.
    pub fn parallel(requests: Vec<AiRequest>, max_concurrency: usize) -> Self {
        Self {
            requests,
            strategy: BatchStrategy::Parallel,
            max_concurrency,
        }
    }

    /// A strictly sequential job.
    pub fn sequential(requests: Vec<AiRequest>) -> Self {
        Self {
            requests,
            strategy: BatchStrategy::Sequential,
            max_concurrency: 1,
        }
    }

    /// Number of requests in the job.
    #[inline]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` for an empty job.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Outcome of one request inside a batch.
///
/// A failed item never aborts its siblings; the error text is carried here
/// instead of being propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AiResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    /// A successful item.
    pub fn ok(response: AiResponse) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    /// A failed item carrying the error text.
    pub fn err(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.to_string()),
        }
    }

    /// Returns `true` when the item succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.success
    }
}
