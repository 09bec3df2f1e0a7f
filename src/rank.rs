//! Ranked results and cosine-similarity search over TF-IDF vectors.
//!
//! Every ranking in this crate goes through [`sort_ranked`], which orders by
//! `(score desc, index asc)` so ties resolve the same way on every run.

use crate::snapshot::Snapshot;
use crate::tfidf::{TfIdfModel, TfIdfVector};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One ranked document. The meaning of `score` depends on the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Position of the document in the fitted corpus.
    pub index: usize,
    /// Raw document text.
    pub text: String,
    /// Relevance score.
    pub score: f32,
}

/// Sort deterministically (score desc, then index asc) and keep at most `top_k`.
pub fn sort_ranked(results: &mut Vec<ScoredDocument>, top_k: Option<usize>) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });
    if let Some(k) = top_k {
        results.truncate(k);
    }
}

/// Cosine similarity between two sparse vectors.
///
/// Terms missing from one side count as 0. Returns 0 when either norm is 0.
pub fn cosine_similarity(a: &TfIdfVector, b: &TfIdfVector) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot = small
        .iter()
        .filter_map(|(term, &x)| large.get(term).map(|&y| x * y))
        .fold(0.0f32, |acc, p| acc + p);
    let norm_a = a.values().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A TF-IDF model plus the cached vector of every fitted document.
#[derive(Debug)]
pub struct CosineIndex {
    model: TfIdfModel,
    doc_vectors: Vec<TfIdfVector>,
}

impl CosineIndex {
    /// Fit the TF-IDF model and precompute one vector per document.
    pub fn fit<I, S>(documents: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = TfIdfModel::fit(documents)?;
        let doc_vectors = model
            .corpus()
            .documents()
            .iter()
            .map(|doc| model.tfidf_vector(doc))
            .collect();
        Ok(Self { model, doc_vectors })
    }

    /// Underlying TF-IDF model.
    pub fn model(&self) -> &TfIdfModel {
        &self.model
    }

    /// Cached vector of document `doc`.
    pub fn document_vector(&self, doc: usize) -> Result<&TfIdfVector, Error> {
        self.model.corpus().check_index(doc)?;
        Ok(&self.doc_vectors[doc])
    }

    /// Rank every document by cosine similarity to `query`.
    pub fn rank(&self, query: &str, top_k: Option<usize>) -> Vec<ScoredDocument> {
        let query_vector = self.model.tfidf_vector(query);
        let mut results: Vec<ScoredDocument> = self
            .doc_vectors
            .iter()
            .zip(self.model.corpus().documents())
            .enumerate()
            .map(|(index, (doc_vector, text))| ScoredDocument {
                index,
                text: text.clone(),
                score: cosine_similarity(&query_vector, doc_vector),
            })
            .collect();
        sort_ranked(&mut results, top_k);
        tracing::trace!(
            query_terms = query_vector.len(),
            results = results.len(),
            "ranked documents by cosine similarity"
        );
        results
    }
}

/// Cosine-similarity search engine over TF-IDF vectors.
///
/// Shareable across threads; `fit` swaps in a new [`CosineIndex`] atomically.
#[derive(Debug, Default)]
pub struct TfIdfRanker {
    index: Snapshot<CosineIndex>,
}

impl TfIdfRanker {
    /// Create an unfitted ranker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on `documents`, replacing any previous corpus.
    pub fn fit<I, S>(&self, documents: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = CosineIndex::fit(documents)?;
        tracing::debug!(
            docs = index.model.corpus().num_docs(),
            vocabulary = index.model.corpus().vocabulary_size(),
            "fitted tf-idf ranker"
        );
        self.index.store(index);
        Ok(())
    }

    /// Whether a corpus has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.index.is_fitted()
    }

    /// The currently fitted index.
    pub fn index(&self) -> Result<Arc<CosineIndex>, Error> {
        self.index.load()
    }

    /// Rank documents by cosine similarity between their cached TF-IDF vector
    /// and the query's vector.
    pub fn rank_documents(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredDocument>, Error> {
        Ok(self.index.load()?.rank(query, top_k))
    }

    /// Cached TF-IDF vector of fitted document `doc`.
    pub fn document_vector(&self, doc: usize) -> Result<TfIdfVector, Error> {
        self.index.load()?.document_vector(doc).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f32)]) -> TfIdfVector {
        pairs.iter().map(|&(t, s)| (t.to_string(), s)).collect()
    }

    fn scored(index: usize, score: f32) -> ScoredDocument {
        ScoredDocument {
            index,
            text: String::new(),
            score,
        }
    }

    #[test]
    fn sort_ranked_breaks_ties_by_index() {
        let mut rs = vec![scored(2, 1.0), scored(0, 0.5), scored(1, 1.0), scored(3, -1.0)];
        sort_ranked(&mut rs, None);
        let order: Vec<usize> = rs.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn sort_ranked_truncates() {
        let mut rs = vec![scored(0, 0.1), scored(1, 0.2)];
        sort_ranked(&mut rs, Some(1));
        assert_eq!(rs.len(), 1);
        assert_eq!(rs[0].index, 1);

        let mut rs = vec![scored(0, 0.1)];
        sort_ranked(&mut rs, Some(10));
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn cosine_handles_disjoint_and_zero_vectors() {
        let a = vector(&[("x", 1.0)]);
        let b = vector(&[("y", 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&a, &TfIdfVector::new()), 0.0);
        assert_eq!(cosine_similarity(&vector(&[("x", 0.0)]), &a), 0.0);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let a = vector(&[("x", 1.0), ("y", 2.0)]);
        let b = vector(&[("x", 2.0), ("y", 4.0)]);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_known_value() {
        let a = vector(&[("x", 1.0), ("y", 0.0)]);
        let b = vector(&[("x", 1.0), ("y", 1.0)]);
        let expected = 1.0 / 2f32.sqrt();
        assert!((cosine_similarity(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn ranker_requires_fit() {
        let r = TfIdfRanker::new();
        assert_eq!(r.rank_documents("cat", None).unwrap_err(), Error::NotFitted);
        assert_eq!(r.document_vector(0).unwrap_err(), Error::NotFitted);
    }

    #[test]
    fn ranker_prefers_matching_document() {
        let r = TfIdfRanker::new();
        r.fit([
            "the cat sat on the mat",
            "the dog ran in the park",
            "cats and dogs are pets",
        ])
        .unwrap();
        let hits = r.rank_documents("dog park", Some(2)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        assert!(hits[0].score > 0.0);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn document_vector_bounds() {
        let r = TfIdfRanker::new();
        r.fit(["a b", "b c"]).unwrap();
        assert!(r.document_vector(1).is_ok());
        assert!(matches!(
            r.document_vector(2),
            Err(Error::IndexOutOfRange { index: 2, doc_count: 2 })
        ));
    }
}
