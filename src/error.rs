//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`SentimentError`] as the error type.

use std::path::PathBuf;
use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`SentimentError`] as the error type.
pub type Result<T> = std::result::Result<T, SentimentError>;

/// The unified error type for all crate errors.
///
/// The first three variants are per-call failures surfaced to whoever
/// submitted the review; the remaining variants can only occur while a
/// pipeline is being built and must halt startup.
///
/// # Example
///
/// ```rust,no_run
/// use review_pipelines::error::SentimentError;
///
/// fn handle_error(e: SentimentError) {
///     match &e {
///         SentimentError::EmptyInput => {
///             // Ask the user for a non-empty review
///         }
///         SentimentError::Vectorization(_) => {
///             // Input could not be encoded - fix and resubmit
///         }
///         SentimentError::Classifier(_) => {
///             // Inference failed - report, do not retry
///         }
///         SentimentError::ArtifactMissing(_) | SentimentError::InvalidArtifact(_) => {
///             // Startup failure - fix the artifact location
///         }
///         SentimentError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         _ => {
///             // Future error variants
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentimentError {
    /// The review was empty or whitespace-only. Nothing was predicted.
    #[error("review text is empty; nothing to analyze")]
    EmptyInput,

    /// The vectorizer rejected the review text.
    #[error("{0}")]
    Vectorization(String),

    /// The classifier failed mid-call (e.g. feature dimension mismatch).
    #[error("{0}")]
    Classifier(String),

    /// A required artifact file does not exist. Startup-only.
    #[error("artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// An artifact file exists but could not be used. Startup-only.
    #[error("{0}")]
    InvalidArtifact(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),
}

impl From<candle_core::Error> for SentimentError {
    fn from(value: candle_core::Error) -> Self {
        SentimentError::Classifier(value.to_string())
    }
}

impl From<serde_json::Error> for SentimentError {
    fn from(value: serde_json::Error) -> Self {
        SentimentError::InvalidArtifact(value.to_string())
    }
}
