use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::model::{LoadedClassifier, TextVectorizer};
use super::pipeline::SentimentPipeline;
use crate::error::{Result, SentimentError};
use crate::loaders::{ClassifierLoader, VectorizerLoader};
use crate::models::TfidfVectorizer;
use crate::pipelines::cache::global_cache;
use crate::pipelines::utils::DeviceRequest;

/// Builder for creating [`SentimentPipeline`] instances.
///
/// Artifacts are loaded once, when `build()` runs; a missing or
/// malformed artifact fails the build before any prediction can be
/// served. Repeated builds against the same artifact files share one
/// in-memory copy.
///
/// # Example
///
/// ```rust,no_run
/// use review_pipelines::sentiment::SentimentPipelineBuilder;
///
/// # fn main() -> review_pipelines::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::from_dir("artifacts").build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipelineBuilder {
    vectorizer_path: Option<PathBuf>,
    classifier_path: Option<PathBuf>,
    vectorizer: Option<Arc<dyn TextVectorizer>>,
    classifier: Option<Arc<LoadedClassifier>>,
    device_request: DeviceRequest,
}

impl Default for SentimentPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentPipelineBuilder {
    /// Create an empty builder; configure artifacts before calling `build()`.
    pub fn new() -> Self {
        Self {
            vectorizer_path: None,
            classifier_path: None,
            vectorizer: None,
            classifier: None,
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Expect `vectorizer.json` and `classifier.json` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new()
            .vectorizer_file(dir.join("vectorizer.json"))
            .classifier_file(dir.join("classifier.json"))
    }

    /// Set the vectorizer artifact path.
    pub fn vectorizer_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vectorizer_path = Some(path.into());
        self
    }

    /// Set the classifier artifact path.
    pub fn classifier_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_path = Some(path.into());
        self
    }

    /// Use an already-constructed vectorizer instead of a file artifact.
    pub fn with_vectorizer<V: TextVectorizer + 'static>(mut self, vectorizer: V) -> Self {
        self.vectorizer = Some(Arc::new(vectorizer));
        self
    }

    /// Use an already-constructed classifier instead of a file artifact.
    pub fn with_classifier(mut self, classifier: LoadedClassifier) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Run on CPU (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Run on a specific CUDA GPU.
    ///
    /// Requires the `cuda` feature to be enabled.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Build the pipeline, loading and validating both artifacts.
    pub fn build(self) -> Result<SentimentPipeline> {
        let device = self.device_request.resolve()?;

        let vectorizer: Arc<dyn TextVectorizer> = match self.vectorizer {
            Some(vectorizer) => vectorizer,
            None => {
                let path = self.vectorizer_path.ok_or_else(|| {
                    SentimentError::InvalidArtifact(
                        "no vectorizer configured; set an artifact path or inject one".to_string(),
                    )
                })?;
                let key = cache_key(&path)?;
                let loaded: Arc<dyn TextVectorizer> = global_cache()
                    .get_or_create::<TfidfVectorizer, _>(&key, || {
                        VectorizerLoader::new(path).load()
                    })?;
                loaded
            }
        };

        let classifier = match self.classifier {
            Some(classifier) => classifier,
            None => {
                let path = self.classifier_path.ok_or_else(|| {
                    SentimentError::InvalidArtifact(
                        "no classifier configured; set an artifact path or inject one".to_string(),
                    )
                })?;
                let key = format!("{}-{:?}", cache_key(&path)?, device.location());
                global_cache().get_or_create::<LoadedClassifier, _>(&key, || {
                    ClassifierLoader::new(path).load(&device)
                })?
            }
        };

        validate_dimensions(vectorizer.as_ref(), &classifier)?;

        Ok(SentimentPipeline {
            vectorizer,
            classifier,
        })
    }
}

/// Cache on the canonical path so relative and absolute spellings of the
/// same artifact share one entry.
fn cache_key(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SentimentError::ArtifactMissing(path.to_path_buf()));
    }
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Ok(canonical.display().to_string())
}

fn validate_dimensions(
    vectorizer: &dyn TextVectorizer,
    classifier: &LoadedClassifier,
) -> Result<()> {
    let produced = vectorizer.dimension();
    let expected = classifier.input_dimension();
    if produced != expected {
        return Err(SentimentError::InvalidArtifact(format!(
            "vectorizer produces {produced}-dimensional vectors but the classifier expects \
             {expected}; the artifacts were not fit together"
        )));
    }
    Ok(())
}
