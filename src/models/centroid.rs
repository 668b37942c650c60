use candle_core::{Device, Tensor, D};

use crate::error::{Result, SentimentError};
use crate::pipelines::sentiment::model::ClassifierModel;

/// Pre-fit nearest-centroid artifact.
///
/// Predicts the class whose centroid is closest in squared Euclidean
/// distance. Exposes neither probabilities nor margins, so pipelines
/// load it with the label-only capability.
#[derive(Debug)]
pub struct NearestCentroidModel {
    centroids: Tensor,
    classes: Vec<String>,
    n_features: usize,
    device: Device,
}

impl NearestCentroidModel {
    /// Create a model from fitted per-class centroids and class labels.
    pub fn new(centroids: Vec<Vec<f32>>, classes: Vec<String>, device: &Device) -> Result<Self> {
        if centroids.is_empty() {
            return Err(SentimentError::InvalidArtifact(
                "classifier has no centroids".to_string(),
            ));
        }
        if centroids.len() != classes.len() {
            return Err(SentimentError::InvalidArtifact(format!(
                "classifier has {} centroids but {} classes",
                centroids.len(),
                classes.len()
            )));
        }
        let n_features = centroids[0].len();
        if n_features == 0 || centroids.iter().any(|row| row.len() != n_features) {
            return Err(SentimentError::InvalidArtifact(
                "classifier centroids are empty or ragged".to_string(),
            ));
        }

        let n_classes = centroids.len();
        let flat: Vec<f32> = centroids.into_iter().flatten().collect();
        let centroids = Tensor::from_vec(flat, (n_classes, n_features), device)
            .map_err(|e| SentimentError::InvalidArtifact(e.to_string()))?;

        Ok(Self {
            centroids,
            classes,
            n_features,
            device: device.clone(),
        })
    }
}

impl ClassifierModel for NearestCentroidModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &[f32]) -> Result<usize> {
        if features.len() != self.n_features {
            return Err(SentimentError::Classifier(format!(
                "feature vector has {} entries but the classifier expects {}",
                features.len(),
                self.n_features
            )));
        }

        let x = Tensor::from_slice(features, (1, self.n_features), &self.device)?;
        let distances = self
            .centroids
            .broadcast_sub(&x)?
            .sqr()?
            .sum(D::Minus1)?
            .to_vec1::<f32>()?;

        distances
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or_else(|| {
                SentimentError::Classifier("classifier produced no distances".to_string())
            })
    }

    fn input_dimension(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_nearest_centroid() {
        let model = NearestCentroidModel::new(
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            vec!["negative".to_string(), "positive".to_string()],
            &Device::Cpu,
        )
        .unwrap();

        assert_eq!(model.predict(&[0.1, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[0.9, 1.0]).unwrap(), 1);
    }

    #[test]
    fn rejects_centroid_class_count_mismatch() {
        let err = NearestCentroidModel::new(
            vec![vec![0.0, 0.0]],
            vec!["negative".to_string(), "positive".to_string()],
            &Device::Cpu,
        )
        .unwrap_err();
        assert!(matches!(err, SentimentError::InvalidArtifact(_)));
    }
}
