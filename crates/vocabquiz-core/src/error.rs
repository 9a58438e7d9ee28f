//! Error types shared across vocabquiz crates.
//!
//! Augmentation and storage errors are defined here, next to the traits that
//! return them, so the session can surface them without knowing which
//! backend produced them.

use thiserror::Error;

/// Errors that can occur when asking an AI backend to augment vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend answered, but not with the JSON shape we asked for.
    #[error("invalid response from AI service: {0}")]
    InvalidResponse(String),
}

impl AugmentError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AugmentError::AuthenticationFailed(_)
                | AugmentError::ModelNotFound(_)
                | AugmentError::InvalidResponse(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            AugmentError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Errors from the persistent topic store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing storage cannot be reached at all.
    #[error("local storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize topics: {0}")]
    Serialize(String),
}

/// Recoverable validation errors raised by the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("a quiz needs at least {required} vocabulary pairs, only {available} available")]
    InsufficientVocabulary { available: usize, required: usize },

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("please enter a topic name")]
    MissingTopicName,

    #[error("no valid vocabulary pairs found, use one `word - meaning` per line")]
    NoValidPairs,

    #[error("at least {required} keywords are needed, only {available} given")]
    NotEnoughKeywords { available: usize, required: usize },

    #[error("please enter at least one English word")]
    NoWords,

    #[error("nothing has been generated yet")]
    NothingGenerated,

    #[error("topic '{0}' is no longer available")]
    TopicUnavailable(String),
}
