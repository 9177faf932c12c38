use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// Sparse feature vector: `(column, value)` pairs sorted by column.
pub type Features = Vec<(usize, f64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// TF-IDF text vectorizer fitted offline and shipped as a JSON artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}
fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"(?u)\b\w\w+\b").unwrap();
}

impl TfidfVectorizer {
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let (min_n, max_n) = self.ngram_range;
        anyhow::ensure!(
            min_n >= 1 && min_n <= max_n,
            "invalid ngram_range ({min_n}, {max_n})"
        );
        anyhow::ensure!(!self.vocabulary.is_empty(), "vectorizer has an empty vocabulary");
        if let Some((term, col)) = self
            .vocabulary
            .iter()
            .find(|(_, col)| **col >= self.idf.len())
        {
            anyhow::bail!(
                "term {term:?} maps to column {col} but idf has {} entries",
                self.idf.len()
            );
        }
        anyhow::ensure!(
            self.idf.iter().all(|v| v.is_finite()),
            "idf contains non-finite values"
        );
        Ok(())
    }

    fn tokenize<'a>(&self, doc: &'a str) -> Vec<&'a str> {
        TOKEN_RE.find_iter(doc).map(|m| m.as_str()).collect()
    }

    /// Maps `text` to its TF-IDF representation. Terms outside the vocabulary
    /// are dropped; an all-unknown text yields an empty vector.
    pub fn transform(&self, text: &str) -> Features {
        let doc = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens = self.tokenize(&doc);

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for gram in tokens.windows(n) {
                if let Some(&col) = self.vocabulary.get(&gram.join(" ")) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut features: Features = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();

        let length = match self.norm {
            Some(Norm::L2) => features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => features.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if length > 0.0 {
            for (_, v) in features.iter_mut() {
                *v /= length;
            }
        }
        features
    }
}
