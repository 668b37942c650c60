use std::collections::HashMap;

use crate::error::{Result, SentimentError};
use crate::pipelines::sentiment::model::TextVectorizer;

/// Pre-fit TF-IDF vectorizer artifact.
///
/// Maps a review to a fixed-width feature vector: term frequency of each
/// in-vocabulary token, scaled by the fitted per-term IDF weight. Terms
/// outside the vocabulary are ignored; a review with no in-vocabulary
/// token maps to the zero vector, which is a valid input for the
/// classifier heads.
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    sublinear_tf: bool,
    l2_normalize: bool,
}

impl TfidfVectorizer {
    /// Create a vectorizer from a fitted vocabulary and IDF table.
    ///
    /// `vocabulary` maps each term to its column index; every index must
    /// fall inside `idf`, whose length fixes the feature dimension.
    pub fn new(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f32>,
        lowercase: bool,
        sublinear_tf: bool,
        l2_normalize: bool,
    ) -> Result<Self> {
        if idf.is_empty() {
            return Err(SentimentError::InvalidArtifact(
                "vectorizer has an empty IDF table".to_string(),
            ));
        }
        for (term, &index) in &vocabulary {
            if index >= idf.len() {
                return Err(SentimentError::InvalidArtifact(format!(
                    "vocabulary term '{}' maps to column {} but the IDF table has {} entries",
                    term,
                    index,
                    idf.len()
                )));
            }
        }

        Ok(Self {
            vocabulary,
            idf,
            lowercase,
            sublinear_tf,
            l2_normalize,
        })
    }

    /// Word tokens: runs of word characters, at least two characters long.
    fn tokenize(text: &str) -> impl Iterator<Item = &str> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|token| token.chars().count() >= 2)
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<Vec<f32>> {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            &lowered
        } else {
            text
        };

        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in Self::tokenize(text) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut features = vec![0.0f32; self.idf.len()];
        for (index, tf) in counts {
            let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
            features[index] = tf * self.idf[index];
        }

        if self.l2_normalize {
            let norm = features.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for value in &mut features {
                    *value /= norm;
                }
            }
        }

        Ok(features)
    }

    fn dimension(&self) -> usize {
        self.idf.len()
    }
}
