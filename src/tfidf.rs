//! Plain TF-IDF over the shared corpus statistics.
//!
//! - TF is the within-text ratio `count(t) / token_count`.
//! - IDF is the unsmoothed `ln(N / df)`, which is exactly 0 for terms that occur in
//!   every document.
//!
//! Vectors can be computed for any text, not just fitted documents: IDF comes from
//! the corpus, TF from the text itself. Terms outside the vocabulary are dropped.
//!
//! References:
//! - Spärck Jones (1972): term specificity / IDF motivation.

use crate::corpus::Corpus;
use crate::snapshot::Snapshot;
use crate::tokenize::tokenize;
use crate::Error;
use rankfns as rf;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Sparse term -> weight vector, ordered by term so sums over it are reproducible.
pub type TfIdfVector = BTreeMap<String, f32>;

/// `count(term) / tokens.len()`, or 0 for an empty token list.
pub fn term_frequency(term: &str, tokens: &[String]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let count = tokens.iter().filter(|t| t.as_str() == term).count();
    count as f32 / tokens.len() as f32
}

/// `ln(num_docs / doc_frequency)`, or 0 when the term occurs nowhere.
pub fn inverse_document_frequency(num_docs: u32, doc_frequency: u32) -> f32 {
    rf::idf_transform(num_docs, doc_frequency, rf::IdfVariant::Standard)
}

/// Fitted TF-IDF state: corpus statistics plus the IDF table.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    corpus: Corpus,
    idf: HashMap<String, f32>,
}

impl TfIdfModel {
    /// Fit on `documents`.
    pub fn fit<I, S>(documents: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::from_corpus(Corpus::fit(documents)?))
    }

    /// Build the IDF table for an already fitted corpus.
    pub fn from_corpus(corpus: Corpus) -> Self {
        // `Corpus::fit` rejects more than `u32::MAX` documents.
        let n = corpus.num_docs() as u32;
        let idf = corpus
            .terms()
            .map(|(term, df)| (term.to_string(), inverse_document_frequency(n, df)))
            .collect();
        Self { corpus, idf }
    }

    /// Fitted corpus statistics.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// IDF of `term`, or `None` outside the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf.get(term).copied()
    }

    /// TF-IDF vector of `text`, restricted to vocabulary terms.
    pub fn tfidf_vector(&self, text: &str) -> TfIdfVector {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return TfIdfVector::new();
        }
        let total = tokens.len() as f32;
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter_map(|(term, count)| {
                let idf = self.idf(term)?;
                Some((term.to_string(), (count as f32 / total) * idf))
            })
            .collect()
    }

    /// The `top_k` highest-weighted terms of `text` (score desc, then term asc).
    pub fn top_keywords(&self, text: &str, top_k: usize) -> Vec<(String, f32)> {
        let mut terms: Vec<(String, f32)> = self.tfidf_vector(text).into_iter().collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(top_k);
        terms
    }
}

/// Thread-safe TF-IDF scorer with replaceable fitted state.
#[derive(Debug, Default)]
pub struct TfIdfScorer {
    model: Snapshot<TfIdfModel>,
}

impl TfIdfScorer {
    /// Create an unfitted scorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on `documents`, replacing any previous corpus.
    pub fn fit<I, S>(&self, documents: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = TfIdfModel::fit(documents)?;
        tracing::debug!(
            docs = model.corpus.num_docs(),
            vocabulary = model.corpus.vocabulary_size(),
            "fitted tf-idf scorer"
        );
        self.model.store(model);
        Ok(())
    }

    /// Whether a corpus has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }

    /// The currently fitted model.
    pub fn model(&self) -> Result<Arc<TfIdfModel>, Error> {
        self.model.load()
    }

    /// IDF of `term` in the fitted corpus (`None` outside the vocabulary).
    pub fn idf(&self, term: &str) -> Result<Option<f32>, Error> {
        Ok(self.model.load()?.idf(term))
    }

    /// TF-IDF vector of arbitrary `text`.
    pub fn calculate_tfidf_vector(&self, text: &str) -> Result<TfIdfVector, Error> {
        Ok(self.model.load()?.tfidf_vector(text))
    }

    /// The `top_k` highest-weighted terms of `text`.
    pub fn get_top_keywords(&self, text: &str, top_k: usize) -> Result<Vec<(String, f32)>, Error> {
        Ok(self.model.load()?.top_keywords(text, top_k))
    }
}
