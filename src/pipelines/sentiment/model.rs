use crate::error::Result;

/// Maps raw review text to the fixed-dimension representation the
/// classifier consumes.
///
/// Implementations are read-only after construction and shared by all
/// prediction calls, so they must be `Send + Sync`.
pub trait TextVectorizer: Send + Sync {
    /// Transform a review into a feature vector of length [`dimension`](Self::dimension).
    fn transform(&self, text: &str) -> Result<Vec<f32>>;

    /// Width of the produced feature vectors.
    fn dimension(&self) -> usize;
}

/// Base capability every classifier artifact exposes: an ordered label
/// set and a single-best-label prediction.
pub trait ClassifierModel: Send + Sync {
    /// The ordered set of labels this classifier can output.
    fn classes(&self) -> &[String];

    /// Predict the most likely class, returned as an index into [`classes`](Self::classes).
    fn predict(&self, features: &[f32]) -> Result<usize>;

    /// Feature-vector width this classifier expects.
    fn input_dimension(&self) -> usize;
}

/// A classifier that can report a probability distribution over its classes.
pub trait ProbabilisticModel: ClassifierModel {
    /// Probability mass per class, in [`classes`](ClassifierModel::classes) order.
    fn class_probabilities(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// A classifier that can report signed distances from its decision boundary.
pub trait MarginModel: ClassifierModel {
    /// Decision margins: one signed value for binary classifiers, one per
    /// class otherwise.
    fn decision_margins(&self, features: &[f32]) -> Result<Vec<f32>>;
}

/// A classifier artifact with its confidence capability resolved.
///
/// The capability check happens exactly once, when the artifact is
/// loaded; prediction calls dispatch on the variant instead of probing.
/// When a classifier supports both probabilities and margins it is
/// loaded as `Probabilistic` - that priority decides which number the
/// user sees.
pub enum LoadedClassifier {
    /// Reports a probability distribution over classes.
    Probabilistic(Box<dyn ProbabilisticModel>),
    /// Reports decision-boundary margins.
    Margin(Box<dyn MarginModel>),
    /// Reports a label and nothing else.
    LabelOnly(Box<dyn ClassifierModel>),
}

impl LoadedClassifier {
    /// The ordered set of labels the underlying classifier can output.
    pub fn classes(&self) -> &[String] {
        match self {
            LoadedClassifier::Probabilistic(m) => m.classes(),
            LoadedClassifier::Margin(m) => m.classes(),
            LoadedClassifier::LabelOnly(m) => m.classes(),
        }
    }

    /// Feature-vector width the underlying classifier expects.
    pub fn input_dimension(&self) -> usize {
        match self {
            LoadedClassifier::Probabilistic(m) => m.input_dimension(),
            LoadedClassifier::Margin(m) => m.input_dimension(),
            LoadedClassifier::LabelOnly(m) => m.input_dimension(),
        }
    }
}
