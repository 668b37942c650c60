use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::Device;
use serde::Deserialize;

use crate::error::{Result, SentimentError};
use crate::models::{
    LinearSvmModel, LogisticRegressionModel, NearestCentroidModel, TfidfVectorizer,
};
use crate::pipelines::sentiment::model::LoadedClassifier;

fn read_artifact(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SentimentError::ArtifactMissing(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| {
        SentimentError::InvalidArtifact(format!("failed to read '{}': {}", path.display(), e))
    })
}

// ============ Vectorizer artifact ============

#[derive(Debug, Clone)]
pub struct VectorizerLoader {
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct RawVectorizer {
    #[serde(alias = "vocabulary_")]
    vocabulary: HashMap<String, usize>,
    #[serde(alias = "idf_")]
    idf: Vec<f32>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: String,
}

fn default_true() -> bool {
    true
}

fn default_norm() -> String {
    "l2".to_string()
}

impl VectorizerLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<TfidfVectorizer> {
        let content = read_artifact(&self.path)?;
        let raw: RawVectorizer = serde_json::from_str(&content).map_err(|e| {
            SentimentError::InvalidArtifact(format!(
                "invalid vectorizer artifact '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let l2_normalize = match raw.norm.as_str() {
            "l2" => true,
            "none" => false,
            other => {
                return Err(SentimentError::InvalidArtifact(format!(
                    "vectorizer artifact '{}' has unsupported norm '{}'; expected 'l2' or 'none'",
                    self.path.display(),
                    other
                )));
            }
        };

        TfidfVectorizer::new(
            raw.vocabulary,
            raw.idf,
            raw.lowercase,
            raw.sublinear_tf,
            l2_normalize,
        )
    }
}

// ============ Classifier artifact ============

#[derive(Debug, Clone)]
pub struct ClassifierLoader {
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct RawClassifier {
    model_type: String,
    #[serde(alias = "classes_")]
    classes: Vec<String>,
    #[serde(default, alias = "coef_")]
    coef: Option<Vec<Vec<f32>>>,
    #[serde(default, alias = "intercept_")]
    intercept: Option<Vec<f32>>,
    #[serde(default, alias = "centroids_")]
    centroids: Option<Vec<Vec<f32>>>,
}

impl ClassifierLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the classifier artifact and resolve its confidence capability.
    ///
    /// The capability is fixed here, once, by `model_type`; prediction
    /// calls never re-probe it.
    pub fn load(&self, device: &Device) -> Result<LoadedClassifier> {
        let content = read_artifact(&self.path)?;
        let raw: RawClassifier = serde_json::from_str(&content).map_err(|e| {
            SentimentError::InvalidArtifact(format!(
                "invalid classifier artifact '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if raw.classes.len() < 2 {
            return Err(SentimentError::InvalidArtifact(format!(
                "classifier artifact '{}' declares {} classes; at least 2 are required",
                self.path.display(),
                raw.classes.len()
            )));
        }

        match raw.model_type.as_str() {
            "logistic_regression" => {
                let (coef, intercept) = self.linear_fields(raw.coef, raw.intercept)?;
                let model = LogisticRegressionModel::new(coef, intercept, raw.classes, device)?;
                Ok(LoadedClassifier::Probabilistic(Box::new(model)))
            }
            "linear_svm" => {
                let (coef, intercept) = self.linear_fields(raw.coef, raw.intercept)?;
                let model = LinearSvmModel::new(coef, intercept, raw.classes, device)?;
                Ok(LoadedClassifier::Margin(Box::new(model)))
            }
            "nearest_centroid" => {
                let centroids = raw.centroids.ok_or_else(|| {
                    SentimentError::InvalidArtifact(format!(
                        "classifier artifact '{}' is missing 'centroids'",
                        self.path.display()
                    ))
                })?;
                let model = NearestCentroidModel::new(centroids, raw.classes, device)?;
                Ok(LoadedClassifier::LabelOnly(Box::new(model)))
            }
            other => Err(SentimentError::InvalidArtifact(format!(
                "classifier artifact '{}' has unknown model_type '{}'; expected \
                 'logistic_regression', 'linear_svm' or 'nearest_centroid'",
                self.path.display(),
                other
            ))),
        }
    }

    fn linear_fields(
        &self,
        coef: Option<Vec<Vec<f32>>>,
        intercept: Option<Vec<f32>>,
    ) -> Result<(Vec<Vec<f32>>, Vec<f32>)> {
        let coef = coef.ok_or_else(|| {
            SentimentError::InvalidArtifact(format!(
                "classifier artifact '{}' is missing 'coef'",
                self.path.display()
            ))
        })?;
        let intercept = intercept.ok_or_else(|| {
            SentimentError::InvalidArtifact(format!(
                "classifier artifact '{}' is missing 'intercept'",
                self.path.display()
            ))
        })?;
        Ok((coef, intercept))
    }
}
