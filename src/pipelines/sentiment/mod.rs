//! Review sentiment pipeline.
//!
//! Classify a review's sentiment and report a confidence value whose
//! meaning depends on what the loaded classifier can do: a probability,
//! a decision margin, or nothing at all.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use review_pipelines::sentiment::{ConfidenceKind, SentimentPipelineBuilder};
//!
//! # fn main() -> review_pipelines::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::from_dir("artifacts").build()?;
//!
//! let output = pipeline.run("The nurses were incredibly kind and attentive")?;
//! match output.prediction.confidence_kind {
//!     ConfidenceKind::Probability => {
//!         println!("{} ({:.2}%)", output.prediction.label, output.prediction.confidence)
//!     }
//!     _ => println!("{}", output.prediction),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! Analyze multiple reviews at once (returns `BatchOutput`):
//!
//! ```rust,no_run
//! # use review_pipelines::sentiment::SentimentPipelineBuilder;
//! # fn main() -> review_pipelines::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::from_dir("artifacts").build()?;
//! let reviews = &[
//!     "Best clinic visit I've ever had!",
//!     "Terrible wait times, very disappointed.",
//!     "It was fine.",
//! ];
//!
//! let output = pipeline.run(reviews)?;
//!
//! for r in output.results {
//!     let p = r.prediction?;
//!     println!("{}: {:?}", r.text, p.category());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Artifacts
//!
//! | Artifact | `model_type` | Confidence |
//! |----------|--------------|------------|
//! | Logistic regression | `logistic_regression` | [`ConfidenceKind::Probability`] |
//! | Linear SVM | `linear_svm` | [`ConfidenceKind::DecisionMargin`] |
//! | Nearest centroid | `nearest_centroid` | [`ConfidenceKind::Unavailable`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{
    LinearSvmModel, LogisticRegressionModel, NearestCentroidModel, TfidfVectorizer,
};
pub use crate::pipelines::stats::PipelineStats;
pub use builder::SentimentPipelineBuilder;
pub use model::{
    ClassifierModel, LoadedClassifier, MarginModel, ProbabilisticModel, TextVectorizer,
};
pub use pipeline::{
    BatchOutput, BatchResult, ConfidenceKind, Output, Prediction, SentimentCategory,
    SentimentPipeline,
};

#[doc(hidden)]
pub use pipeline::SentimentInput;
