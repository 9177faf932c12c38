use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::info;

use super::{classifier::Classifier, vectorizer::TfidfVectorizer};

/// Top label for a piece of text and how sure the model is, as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Loaded vectorizer/classifier pair. Immutable once built and shared by all
/// requests behind an `Arc`.
#[derive(Debug)]
pub struct Predictor {
    vectorizer: TfidfVectorizer,
    classifier: Classifier,
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read model artifact {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse model artifact {}", path.display()))
}

impl Predictor {
    pub fn new(vectorizer: TfidfVectorizer, classifier: Classifier) -> anyhow::Result<Self> {
        vectorizer.validate().context("invalid vectorizer")?;
        let n_features = classifier.validate().context("invalid classifier")?;
        anyhow::ensure!(
            vectorizer.n_features() == n_features,
            "vectorizer produces {} features but classifier expects {n_features}",
            vectorizer.n_features()
        );
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Reads both artifacts from disk. Any failure here is fatal for startup.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> anyhow::Result<Self> {
        let vectorizer: TfidfVectorizer = read_artifact(vectorizer_path)?;
        let classifier: Classifier = read_artifact(classifier_path)?;
        let predictor = Self::new(vectorizer, classifier).with_context(|| {
            format!(
                "load model from {} and {}",
                vectorizer_path.display(),
                classifier_path.display()
            )
        })?;
        info!(
            vectorizer = %vectorizer_path.display(),
            classifier = %classifier_path.display(),
            features = predictor.vectorizer.n_features(),
            classes = predictor.classes().len(),
            "model loaded"
        );
        Ok(predictor)
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn predict(&self, text: &str) -> Prediction {
        let features = self.vectorizer.transform(text);
        let label = self.classifier.predict(&features).to_string();
        let top = self
            .classifier
            .predict_proba(&features)
            .into_iter()
            .fold(0.0, f64::max);
        Prediction {
            label,
            confidence: (top * 100.0).clamp(0.0, 100.0),
        }
    }
}
