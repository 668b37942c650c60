use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use review_pipelines::error::{Result, SentimentError};
use review_pipelines::sentiment::{
    ClassifierModel, ConfidenceKind, LoadedClassifier, MarginModel, ProbabilisticModel,
    SentimentCategory, SentimentPipelineBuilder, TextVectorizer,
};

const DIM: usize = 4;

/// Vectorizer stub that counts how often it is invoked.
struct CountingVectorizer {
    calls: Arc<AtomicUsize>,
}

impl TextVectorizer for CountingVectorizer {
    fn transform(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0; DIM])
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

struct FixedProbabilities {
    classes: Vec<String>,
    probabilities: Vec<f32>,
}

impl ClassifierModel for FixedProbabilities {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, _features: &[f32]) -> Result<usize> {
        Ok(self
            .probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap())
    }

    fn input_dimension(&self) -> usize {
        DIM
    }
}

impl ProbabilisticModel for FixedProbabilities {
    fn class_probabilities(&self, _features: &[f32]) -> Result<Vec<f32>> {
        Ok(self.probabilities.clone())
    }
}

struct FixedMargins {
    classes: Vec<String>,
    margins: Vec<f32>,
    predicted: usize,
}

impl ClassifierModel for FixedMargins {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, _features: &[f32]) -> Result<usize> {
        Ok(self.predicted)
    }

    fn input_dimension(&self) -> usize {
        DIM
    }
}

impl MarginModel for FixedMargins {
    fn decision_margins(&self, _features: &[f32]) -> Result<Vec<f32>> {
        Ok(self.margins.clone())
    }
}

struct LabelOnly {
    classes: Vec<String>,
}

impl ClassifierModel for LabelOnly {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, _features: &[f32]) -> Result<usize> {
        Ok(0)
    }

    fn input_dimension(&self) -> usize {
        DIM
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn counting_vectorizer() -> (CountingVectorizer, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        CountingVectorizer {
            calls: calls.clone(),
        },
        calls,
    )
}

#[test]
fn probability_classifier_reports_percent_mass_at_predicted_label() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Probabilistic(Box::new(
            FixedProbabilities {
                classes: labels(&["negative", "positive"]),
                probabilities: vec![0.13, 0.87],
            },
        )))
        .build()?;

    let output = pipeline.run("The nurses were incredibly kind and attentive")?;
    assert_eq!(output.prediction.label, "positive");
    assert_eq!(output.prediction.confidence, 87.00);
    assert_eq!(output.prediction.confidence_kind, ConfidenceKind::Probability);
    assert_eq!(output.prediction.category(), SentimentCategory::Positive);
    Ok(())
}

#[test]
fn whitespace_review_fails_before_the_vectorizer_runs() -> Result<()> {
    let (vectorizer, calls) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::LabelOnly(Box::new(LabelOnly {
            classes: labels(&["negative", "positive"]),
        })))
        .build()?;

    let err = pipeline.run("   ").unwrap_err();
    assert!(matches!(err, SentimentError::EmptyInput));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn binary_margin_classifier_reports_absolute_margin() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Margin(Box::new(FixedMargins {
            classes: labels(&["negative", "positive"]),
            margins: vec![-2.341],
            predicted: 0,
        })))
        .build()?;

    let output = pipeline.run("Worst experience of my life")?;
    assert_eq!(output.prediction.label, "negative");
    assert_eq!(output.prediction.confidence, 2.341);
    assert_eq!(
        output.prediction.confidence_kind,
        ConfidenceKind::DecisionMargin
    );
    assert_eq!(output.prediction.category(), SentimentCategory::Negative);
    Ok(())
}

#[test]
fn multiclass_margin_classifier_reports_largest_absolute_margin() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Margin(Box::new(FixedMargins {
            classes: labels(&["negative", "neutral", "positive"]),
            margins: vec![-0.25, 1.5, -3.75],
            predicted: 1,
        })))
        .build()?;

    let output = pipeline.run("It was fine I suppose")?;
    assert_eq!(output.prediction.confidence, 3.75);
    assert_eq!(
        output.prediction.confidence_kind,
        ConfidenceKind::DecisionMargin
    );
    Ok(())
}

#[test]
fn label_only_classifier_still_predicts_with_unavailable_confidence() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::LabelOnly(Box::new(LabelOnly {
            classes: labels(&["negative", "positive"]),
        })))
        .build()?;

    let output = pipeline.run("No confidence available for this one")?;
    assert_eq!(output.prediction.label, "negative");
    assert_eq!(output.prediction.confidence, 0.0);
    assert_eq!(
        output.prediction.confidence_kind,
        ConfidenceKind::Unavailable
    );
    Ok(())
}

#[test]
fn predicted_label_is_always_drawn_from_the_class_list() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let classes = labels(&["negative", "positive"]);
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Probabilistic(Box::new(
            FixedProbabilities {
                classes: classes.clone(),
                probabilities: vec![0.6, 0.4],
            },
        )))
        .build()?;

    for text in ["great", "awful", "meh", "the staff was rude"] {
        let output = pipeline.run(text)?;
        assert!(classes.contains(&output.prediction.label));
    }
    Ok(())
}

#[test]
fn repeated_runs_are_idempotent() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Probabilistic(Box::new(
            FixedProbabilities {
                classes: labels(&["negative", "positive"]),
                probabilities: vec![0.13, 0.87],
            },
        )))
        .build()?;

    let text = "Clean rooms and a friendly front desk";
    let first = pipeline.run(text)?.prediction;
    let second = pipeline.run(text)?.prediction;
    assert_eq!(first.label, second.label);
    assert_eq!(first.confidence, second.confidence);
    Ok(())
}

#[test]
fn batch_keeps_per_review_errors_independent() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Probabilistic(Box::new(
            FixedProbabilities {
                classes: labels(&["negative", "positive"]),
                probabilities: vec![0.13, 0.87],
            },
        )))
        .build()?;

    let reviews = &["Great service", "   ", "Long waits every single visit"];
    let output = pipeline.run(reviews)?;

    assert_eq!(output.results.len(), 3);
    assert_eq!(output.stats.items_processed, 3);
    assert!(output.results[0].prediction.is_ok());
    assert!(matches!(
        output.results[1].prediction,
        Err(SentimentError::EmptyInput)
    ));
    assert!(output.results[2].prediction.is_ok());
    assert_eq!(output.results[2].text, reviews[2]);
    Ok(())
}

#[test]
fn unusual_labels_fall_into_the_neutral_category_verbatim() -> Result<()> {
    let (vectorizer, _) = counting_vectorizer();
    let pipeline = SentimentPipelineBuilder::new()
        .with_vectorizer(vectorizer)
        .with_classifier(LoadedClassifier::Probabilistic(Box::new(
            FixedProbabilities {
                classes: labels(&["Mixed_Feelings", "POSITIVE"]),
                probabilities: vec![0.7, 0.3],
            },
        )))
        .build()?;

    let output = pipeline.run("I both loved and hated it")?;
    assert_eq!(output.prediction.label, "Mixed_Feelings");
    assert_eq!(
        output.prediction.category(),
        SentimentCategory::NeutralOrOther
    );
    Ok(())
}

#[test]
fn mismatched_injected_artifacts_fail_at_build_time() {
    struct TinyVectorizer;

    impl TextVectorizer for TinyVectorizer {
        fn transform(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        fn dimension(&self) -> usize {
            1
        }
    }

    let err = SentimentPipelineBuilder::new()
        .with_vectorizer(TinyVectorizer)
        .with_classifier(LoadedClassifier::LabelOnly(Box::new(LabelOnly {
            classes: labels(&["negative", "positive"]),
        })))
        .build()
        .unwrap_err();
    assert!(matches!(err, SentimentError::InvalidArtifact(_)));
}
