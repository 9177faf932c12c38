use serde::Deserialize;

use super::vectorizer::Features;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    Multinomial,
    Ovr,
}

/// Linear model: one coefficient row and intercept per class. A binary model
/// may carry a single row scoring the second class against the first.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultinomialNb {
    pub classes: Vec<String>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
}

/// Trained classifier as stored on disk, tagged by `"kind"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    MultinomialNb(MultinomialNb),
}

fn dot(row: &[f64], x: &Features) -> f64 {
    x.iter().map(|&(col, v)| row[col] * v).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// First index holding the largest value.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn check_matrix(name: &str, rows: &[Vec<f64>], n_rows: usize) -> anyhow::Result<usize> {
    anyhow::ensure!(
        rows.len() == n_rows,
        "{name} has {} rows, expected {n_rows}",
        rows.len()
    );
    let width = rows.first().map(Vec::len).unwrap_or(0);
    anyhow::ensure!(width > 0, "{name} has no feature columns");
    for (i, row) in rows.iter().enumerate() {
        anyhow::ensure!(
            row.len() == width,
            "{name} row {i} has {} columns, expected {width}",
            row.len()
        );
        anyhow::ensure!(
            row.iter().all(|v| v.is_finite()),
            "{name} row {i} contains non-finite values"
        );
    }
    Ok(width)
}

impl LogisticRegression {
    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coef.len() == 1
    }

    fn decision_function(&self, x: &Features) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| dot(row, x) + b)
            .collect()
    }

    fn validate(&self) -> anyhow::Result<usize> {
        let rows = if self.is_binary() { 1 } else { self.classes.len() };
        let width = check_matrix("coef", &self.coef, rows)?;
        anyhow::ensure!(
            self.intercept.len() == rows,
            "intercept has {} entries, expected {rows}",
            self.intercept.len()
        );
        Ok(width)
    }

    fn predict_index(&self, x: &Features) -> usize {
        let scores = self.decision_function(x);
        if self.is_binary() {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores)
        }
    }

    fn predict_proba(&self, x: &Features) -> Vec<f64> {
        let scores = self.decision_function(x);
        if self.is_binary() {
            let d = scores[0];
            let p = match self.multi_class {
                MultiClass::Multinomial => sigmoid(2.0 * d),
                MultiClass::Ovr => sigmoid(d),
            };
            return vec![1.0 - p, p];
        }
        match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().copied().map(sigmoid).collect();
                let total: f64 = raw.iter().sum();
                if total > 0.0 {
                    raw.into_iter().map(|p| p / total).collect()
                } else {
                    // every sigmoid underflowed; for very negative z, sigmoid(z) ~ exp(z)
                    softmax(&scores)
                }
            }
        }
    }
}

impl MultinomialNb {
    fn joint_log_likelihood(&self, x: &Features) -> Vec<f64> {
        self.feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(row, prior)| prior + dot(row, x))
            .collect()
    }

    fn validate(&self) -> anyhow::Result<usize> {
        let width = check_matrix("feature_log_prob", &self.feature_log_prob, self.classes.len())?;
        anyhow::ensure!(
            self.class_log_prior.len() == self.classes.len(),
            "class_log_prior has {} entries, expected {}",
            self.class_log_prior.len(),
            self.classes.len()
        );
        Ok(width)
    }
}

impl Classifier {
    pub fn classes(&self) -> &[String] {
        match self {
            Classifier::LogisticRegression(m) => &m.classes,
            Classifier::MultinomialNb(m) => &m.classes,
        }
    }

    /// Checks internal shapes and returns the number of input features.
    pub fn validate(&self) -> anyhow::Result<usize> {
        anyhow::ensure!(!self.classes().is_empty(), "classifier has no classes");
        match self {
            Classifier::LogisticRegression(m) => m.validate(),
            Classifier::MultinomialNb(m) => m.validate(),
        }
    }

    pub fn predict(&self, x: &Features) -> &str {
        let idx = match self {
            Classifier::LogisticRegression(m) => m.predict_index(x),
            Classifier::MultinomialNb(m) => argmax(&m.joint_log_likelihood(x)),
        };
        &self.classes()[idx]
    }

    /// Probability of each class, in `classes()` order; sums to 1.
    pub fn predict_proba(&self, x: &Features) -> Vec<f64> {
        match self {
            Classifier::LogisticRegression(m) => m.predict_proba(x),
            Classifier::MultinomialNb(m) => softmax(&m.joint_log_likelihood(x)),
        }
    }
}
