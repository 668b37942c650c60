use std::fmt;
use std::sync::Arc;

use super::model::{LoadedClassifier, TextVectorizer};
use crate::error::{Result, SentimentError};
use crate::pipelines::stats::PipelineStats;

// ============ Output types ============

/// Which kind of confidence value a [`Prediction`] carries.
///
/// Probabilities are reported as percentages rounded to 2 decimal
/// places; margins are reported on the classifier's raw scale rounded
/// to 3 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceKind {
    /// Probability mass assigned to the predicted label, as a percentage in [0, 100].
    Probability,
    /// Absolute distance from the decision boundary (unbounded, classifier-dependent scale).
    DecisionMargin,
    /// The classifier exposes no confidence capability; the value is 0.
    Unavailable,
}

/// Three-way presentation category derived from a predicted label.
///
/// Presentation metadata only: the label string on the prediction is
/// never rewritten to match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentCategory {
    /// The label is "positive" (case-insensitive).
    Positive,
    /// The label is "negative" (case-insensitive).
    Negative,
    /// Any other label.
    NeutralOrOther,
}

impl SentimentCategory {
    /// Classify a label against the literals "positive" and "negative".
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("positive") {
            SentimentCategory::Positive
        } else if label.eq_ignore_ascii_case("negative") {
            SentimentCategory::Negative
        } else {
            SentimentCategory::NeutralOrOther
        }
    }
}

/// A sentiment prediction with label and confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted label, verbatim from the classifier's class list.
    pub label: String,
    /// Confidence value; see [`ConfidenceKind`] for its scale. Always non-negative.
    pub confidence: f32,
    /// Which kind of confidence value this is.
    pub confidence_kind: ConfidenceKind,
}

impl Prediction {
    /// Presentation category for this prediction's label.
    pub fn category(&self) -> SentimentCategory {
        SentimentCategory::from_label(&self.label)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.confidence_kind {
            ConfidenceKind::Probability => {
                write!(f, "{} ({:.2}%)", self.label, self.confidence)
            }
            ConfidenceKind::DecisionMargin => {
                write!(f, "{} (margin {:.3})", self.label, self.confidence)
            }
            ConfidenceKind::Unavailable => write!(f, "{}", self.label),
        }
    }
}

/// Single-text output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Single result in batch output.
#[derive(Debug)]
pub struct BatchResult {
    /// Input text.
    pub text: String,
    /// Prediction or error for this input.
    pub prediction: Result<Prediction>,
}

/// Batch output from `run()`.
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each input.
    pub results: Vec<BatchResult>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

#[doc(hidden)]
pub trait SentimentInput<'a> {
    /// Output type for `.run()`.
    type Output;

    #[doc(hidden)]
    fn into_texts(self) -> Vec<&'a str>;
    #[doc(hidden)]
    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output>;
}

impl<'a> SentimentInput<'a> for &'a str {
    type Output = Output;

    fn into_texts(self) -> Vec<&'a str> {
        vec![self]
    }

    fn convert_output(
        _texts: Vec<&'a str>,
        mut predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let prediction = predictions
            .pop()
            .ok_or_else(|| SentimentError::Classifier("No predictions returned".into()))??;
        Ok(Output { prediction, stats })
    }
}

impl<'a> SentimentInput<'a> for &'a [&'a str] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let results = texts
            .into_iter()
            .zip(predictions)
            .map(|(text, prediction)| BatchResult {
                text: text.to_string(),
                prediction,
            })
            .collect();
        Ok(BatchOutput { results, stats })
    }
}

impl<'a, const N: usize> SentimentInput<'a> for &'a [&'a str; N] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.as_slice().to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Result<Prediction>>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let results = texts
            .into_iter()
            .zip(predictions)
            .map(|(text, prediction)| BatchResult {
                text: text.to_string(),
                prediction,
            })
            .collect();
        Ok(BatchOutput { results, stats })
    }
}

// ============ Pipeline ============

/// Predicts review sentiment from pre-fit vectorizer and classifier artifacts.
///
/// Construct with [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
/// The artifacts are loaded once and shared read-only; each `run` call is
/// synchronous, stateless and free of side effects.
///
/// # Examples
///
/// ```rust,no_run
/// # use review_pipelines::sentiment::SentimentPipelineBuilder;
/// # fn main() -> review_pipelines::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::from_dir("artifacts").build()?;
///
/// // Single text - direct access
/// let output = pipeline.run("The nurses were incredibly kind and attentive")?;
/// println!("{}", output.prediction);
///
/// // Batch - results include input text
/// let output = pipeline.run(&["Great clinic!", "Terrible wait times."])?;
/// for r in output.results {
///     println!("{} → {}", r.text, r.prediction?.label);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipeline {
    pub(crate) vectorizer: Arc<dyn TextVectorizer>,
    pub(crate) classifier: Arc<LoadedClassifier>,
}

impl std::fmt::Debug for SentimentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentPipeline")
            .field("dimension", &self.vectorizer.dimension())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl SentimentPipeline {
    /// Analyze review sentiment.
    ///
    /// Single input → [`Output`], batch → [`BatchOutput`]. In a batch,
    /// each review succeeds or fails independently.
    pub fn run<'a, I: SentimentInput<'a>>(&self, input: I) -> Result<I::Output> {
        let stats_builder = PipelineStats::start();
        let texts = input.into_texts();
        let item_count = texts.len();

        let predictions: Vec<Result<Prediction>> =
            texts.iter().map(|text| self.predict_one(text)).collect();

        I::convert_output(texts, predictions, stats_builder.finish(item_count))
    }

    /// The ordered set of labels the loaded classifier can output.
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    fn predict_one(&self, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Err(SentimentError::EmptyInput);
        }

        let features = self.vectorizer.transform(text)?;

        let (label, confidence, confidence_kind) = match self.classifier.as_ref() {
            LoadedClassifier::Probabilistic(model) => {
                let index = model.predict(&features)?;
                let label = class_at(model.classes(), index)?;
                let probabilities = model.class_probabilities(&features)?;
                let mass = probabilities.get(index).copied().ok_or_else(|| {
                    SentimentError::Classifier(format!(
                        "no probability mass at class index {index}"
                    ))
                })?;
                (
                    label,
                    round_to(mass * 100.0, 2),
                    ConfidenceKind::Probability,
                )
            }
            LoadedClassifier::Margin(model) => {
                let index = model.predict(&features)?;
                let label = class_at(model.classes(), index)?;
                let margins = model.decision_margins(&features)?;
                if margins.is_empty() {
                    return Err(SentimentError::Classifier(
                        "classifier produced no decision margins".to_string(),
                    ));
                }
                // Binary: one signed margin. Multi-class: one per class,
                // report the largest distance from the boundary.
                let margin = if model.classes().len() == 2 {
                    margins[0].abs()
                } else {
                    margins.iter().map(|m| m.abs()).fold(0.0, f32::max)
                };
                (label, round_to(margin, 3), ConfidenceKind::DecisionMargin)
            }
            LoadedClassifier::LabelOnly(model) => {
                let index = model.predict(&features)?;
                let label = class_at(model.classes(), index)?;
                (label, 0.0, ConfidenceKind::Unavailable)
            }
        };

        Ok(Prediction {
            label,
            confidence,
            confidence_kind,
        })
    }
}

fn class_at(classes: &[String], index: usize) -> Result<String> {
    classes.get(index).cloned().ok_or_else(|| {
        SentimentError::Classifier(format!(
            "predicted class index {} is outside the {} known classes",
            index,
            classes.len()
        ))
    })
}

fn round_to(value: f32, places: i32) -> f32 {
    let factor = 10f32.powi(places);
    (value * factor).round() / factor
}
