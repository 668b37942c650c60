use candle_core::{Device, Tensor, D};
use candle_nn::ops::softmax;

use crate::error::{Result, SentimentError};
use crate::pipelines::sentiment::model::{ClassifierModel, MarginModel, ProbabilisticModel};

/// Shared linear scoring head: `scores = x · Wᵀ + b`.
///
/// Binary heads carry a single coefficient row; a positive score selects
/// the second class. Multi-class heads carry one row per class and
/// select by argmax.
#[derive(Debug)]
struct LinearHead {
    weights: Tensor,
    bias: Tensor,
    classes: Vec<String>,
    n_features: usize,
    device: Device,
}

impl LinearHead {
    fn new(
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
        classes: Vec<String>,
        device: &Device,
    ) -> Result<Self> {
        let n_outputs = coef.len();
        if n_outputs == 0 {
            return Err(SentimentError::InvalidArtifact(
                "classifier has no coefficient rows".to_string(),
            ));
        }
        let n_features = coef[0].len();
        if n_features == 0 || coef.iter().any(|row| row.len() != n_features) {
            return Err(SentimentError::InvalidArtifact(
                "classifier coefficient rows are empty or ragged".to_string(),
            ));
        }
        if intercept.len() != n_outputs {
            return Err(SentimentError::InvalidArtifact(format!(
                "classifier has {} coefficient rows but {} intercepts",
                n_outputs,
                intercept.len()
            )));
        }
        if n_outputs == 1 {
            if classes.len() != 2 {
                return Err(SentimentError::InvalidArtifact(format!(
                    "single-row classifier requires exactly 2 classes, got {}",
                    classes.len()
                )));
            }
        } else if classes.len() != n_outputs {
            return Err(SentimentError::InvalidArtifact(format!(
                "classifier has {} coefficient rows but {} classes",
                n_outputs,
                classes.len()
            )));
        }

        let flat: Vec<f32> = coef.into_iter().flatten().collect();
        let weights = Tensor::from_vec(flat, (n_outputs, n_features), device)
            .map_err(|e| SentimentError::InvalidArtifact(e.to_string()))?;
        let bias = Tensor::from_vec(intercept, n_outputs, device)
            .map_err(|e| SentimentError::InvalidArtifact(e.to_string()))?;

        Ok(Self {
            weights,
            bias,
            classes,
            n_features,
            device: device.clone(),
        })
    }

    /// Raw decision scores as a `(1, n_outputs)` tensor.
    fn score_tensor(&self, features: &[f32]) -> Result<Tensor> {
        if features.len() != self.n_features {
            return Err(SentimentError::Classifier(format!(
                "feature vector has {} entries but the classifier expects {}",
                features.len(),
                self.n_features
            )));
        }

        let x = Tensor::from_slice(features, (1, self.n_features), &self.device)?;
        let scores = x.matmul(&self.weights.t()?)?.broadcast_add(&self.bias)?;
        Ok(scores)
    }

    fn decision_scores(&self, features: &[f32]) -> Result<Vec<f32>> {
        Ok(self.score_tensor(features)?.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn predict_index(&self, scores: &[f32]) -> Result<usize> {
        match scores.len() {
            0 => Err(SentimentError::Classifier(
                "classifier produced no decision scores".to_string(),
            )),
            1 => Ok(usize::from(scores[0] > 0.0)),
            _ => Ok(argmax(scores)),
        }
    }
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Pre-fit linear SVM artifact. Reports decision-boundary margins.
#[derive(Debug)]
pub struct LinearSvmModel {
    head: LinearHead,
}

impl LinearSvmModel {
    /// Create a model from fitted coefficients, intercepts and class labels.
    pub fn new(
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
        classes: Vec<String>,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            head: LinearHead::new(coef, intercept, classes, device)?,
        })
    }
}

impl ClassifierModel for LinearSvmModel {
    fn classes(&self) -> &[String] {
        &self.head.classes
    }

    fn predict(&self, features: &[f32]) -> Result<usize> {
        let scores = self.head.decision_scores(features)?;
        self.head.predict_index(&scores)
    }

    fn input_dimension(&self) -> usize {
        self.head.n_features
    }
}

impl MarginModel for LinearSvmModel {
    fn decision_margins(&self, features: &[f32]) -> Result<Vec<f32>> {
        self.head.decision_scores(features)
    }
}

/// Pre-fit logistic regression artifact. Reports class probabilities.
pub struct LogisticRegressionModel {
    head: LinearHead,
}

impl LogisticRegressionModel {
    /// Create a model from fitted coefficients, intercepts and class labels.
    pub fn new(
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
        classes: Vec<String>,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            head: LinearHead::new(coef, intercept, classes, device)?,
        })
    }
}

impl ClassifierModel for LogisticRegressionModel {
    fn classes(&self) -> &[String] {
        &self.head.classes
    }

    fn predict(&self, features: &[f32]) -> Result<usize> {
        let scores = self.head.decision_scores(features)?;
        self.head.predict_index(&scores)
    }

    fn input_dimension(&self) -> usize {
        self.head.n_features
    }
}

impl ProbabilisticModel for LogisticRegressionModel {
    fn class_probabilities(&self, features: &[f32]) -> Result<Vec<f32>> {
        let scores = self.head.score_tensor(features)?;
        if self.head.classes.len() == 2 && scores.dim(D::Minus1)? == 1 {
            let score = scores.squeeze(0)?.to_vec1::<f32>()?[0];
            let positive = sigmoid(score);
            return Ok(vec![1.0 - positive, positive]);
        }

        let probabilities = softmax(&scores, D::Minus1)?;
        Ok(probabilities.squeeze(0)?.to_vec1::<f32>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn binary_svm_uses_sign_of_single_margin() {
        let svm = LinearSvmModel::new(
            vec![vec![1.0, -1.0]],
            vec![0.0],
            labels(&["negative", "positive"]),
            &Device::Cpu,
        )
        .unwrap();

        assert_eq!(svm.predict(&[2.0, 0.0]).unwrap(), 1);
        assert_eq!(svm.predict(&[0.0, 3.0]).unwrap(), 0);
        assert_eq!(svm.decision_margins(&[2.0, 0.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn multiclass_svm_picks_argmax_score() {
        let svm = LinearSvmModel::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.0],
            labels(&["negative", "positive", "neutral"]),
            &Device::Cpu,
        )
        .unwrap();

        assert_eq!(svm.predict(&[0.0, 5.0]).unwrap(), 1);
        let margins = svm.decision_margins(&[0.0, 5.0]).unwrap();
        assert_eq!(margins.len(), 3);
        assert_eq!(margins[1], 5.0);
    }

    #[test]
    fn binary_logistic_probabilities_sum_to_one() {
        let lr = LogisticRegressionModel::new(
            vec![vec![1.0, 0.0]],
            vec![0.0],
            labels(&["negative", "positive"]),
            &Device::Cpu,
        )
        .unwrap();

        let probs = lr.class_probabilities(&[0.0, 0.0]).unwrap();
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);

        let probs = lr.class_probabilities(&[3.0_f32.ln(), 0.0]).unwrap();
        assert!((probs[1] - 0.75).abs() < 1e-5);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn multiclass_logistic_softmax_is_uniform_for_equal_scores() {
        let lr = LogisticRegressionModel::new(
            vec![vec![0.0, 0.0]; 3],
            vec![0.0, 0.0, 0.0],
            labels(&["negative", "positive", "neutral"]),
            &Device::Cpu,
        )
        .unwrap();

        let probs = lr.class_probabilities(&[1.0, 1.0]).unwrap();
        assert_eq!(probs.len(), 3);
        for p in probs {
            assert!((p - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn feature_length_mismatch_is_a_classifier_error() {
        let svm = LinearSvmModel::new(
            vec![vec![1.0, -1.0]],
            vec![0.0],
            labels(&["negative", "positive"]),
            &Device::Cpu,
        )
        .unwrap();

        let err = svm.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, SentimentError::Classifier(_)));
    }

    #[test]
    fn single_row_head_requires_two_classes() {
        let err = LinearSvmModel::new(
            vec![vec![1.0]],
            vec![0.0],
            labels(&["negative", "positive", "neutral"]),
            &Device::Cpu,
        )
        .unwrap_err();
        assert!(matches!(err, SentimentError::InvalidArtifact(_)));
    }
}
