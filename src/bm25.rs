//! Okapi BM25 over a fitted [`Corpus`].
//!
//! - IDF is the smoothed `ln((N - df + 0.5) / (df + 0.5))`. It goes negative for
//!   terms in more than half the corpus; that is kept as-is, not clamped.
//! - Per-term score: `idf * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))`.
//! - Query tokens are summed with repetition; out-of-vocabulary tokens add nothing.
//! - Ranking is deterministic (score desc, then document index asc).
//!
//! References:
//! - Robertson & Walker (1994). "Some simple effective approximations to the 2-Poisson model..."
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."

use crate::config;
use crate::corpus::Corpus;
use crate::rank::{sort_ranked, ScoredDocument};
use crate::snapshot::Snapshot;
use crate::tokenize::tokenize;
use crate::Error;
use rankfns::bm25_tf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation parameter. Must be `> 0`.
    pub k1: f32,
    /// Length normalization parameter. Must be in `[0, 1]`.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: config::BM25_K1,
            b: config::BM25_B,
        }
    }
}

impl Bm25Params {
    /// Parameters with explicit `k1` and `b` (not yet validated).
    pub fn new(k1: f32, b: f32) -> Self {
        Self { k1, b }
    }

    /// Reject `k1 <= 0` (or non-finite) and `b` outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.k1.is_finite() && self.k1 > 0.0) {
            return Err(Error::InvalidParameter("k1 must be a finite value > 0"));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidParameter("b must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Smoothed BM25 IDF. Negative once `df > n / 2`.
///
/// `rankfns` only ships the `ln(1 + ...)` form, which never goes negative.
pub fn bm25_idf(num_docs: f32, doc_frequency: f32) -> f32 {
    ((num_docs - doc_frequency + 0.5) / (doc_frequency + 0.5)).ln()
}

/// One query term's share of a document's BM25 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermContribution {
    /// The (normalized) query term.
    pub term: String,
    /// Occurrences of the term in the query.
    pub query_count: u32,
    /// Occurrences of the term in the document.
    pub doc_tf: u32,
    /// Smoothed IDF of the term.
    pub idf: f32,
    /// `1 - b + b * dl / avgdl` for the document.
    pub length_norm: f32,
    /// Score of a single query occurrence.
    pub term_score: f32,
    /// `term_score * query_count`.
    pub weighted_score: f32,
}

/// Per-term breakdown of a document's BM25 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Explained document.
    pub document_index: usize,
    /// Token count of the document.
    pub document_length: u32,
    /// Average document length of the corpus.
    pub avg_doc_length: f32,
    /// `document_length / avg_doc_length`.
    pub length_ratio: f32,
    /// Distinct in-vocabulary query terms, in first-occurrence order.
    pub terms: Vec<TermContribution>,
    /// Sum of `weighted_score` over `terms`.
    pub total_score: f32,
}

/// Summary of the fitted corpus and the active parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    /// Number of documents.
    pub doc_count: usize,
    /// Distinct terms.
    pub vocabulary_size: usize,
    /// Mean document length.
    pub avg_doc_length: f32,
    /// Sum of document lengths.
    pub total_terms: u64,
    /// Shortest document.
    pub min_doc_length: u32,
    /// Longest document.
    pub max_doc_length: u32,
    /// Active `k1`.
    pub k1: f32,
    /// Active `b`.
    pub b: f32,
}

/// Fitted BM25 state: corpus statistics, IDF table and parameters.
#[derive(Debug, Clone)]
pub struct Bm25Model {
    corpus: Corpus,
    idf: HashMap<String, f32>,
    params: Bm25Params,
}

impl Bm25Model {
    /// Fit on `documents` with `params`.
    pub fn fit<I, S>(documents: I, params: Bm25Params) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        params.validate()?;
        let corpus = Corpus::fit(documents)?;
        let n = corpus.num_docs() as f32;
        let idf = corpus
            .terms()
            .map(|(term, df)| (term.to_string(), bm25_idf(n, df as f32)))
            .collect();
        Ok(Self {
            corpus,
            idf,
            params,
        })
    }

    /// Fitted corpus statistics.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Parameters this model scores with.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Smoothed IDF of `term`, or `None` outside the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf.get(term).copied()
    }

    fn length_norm(&self, doc: usize) -> f32 {
        let b = self.params.b;
        let ratio = self.corpus.document_length(doc) as f32 / self.corpus.avg_doc_len();
        1.0 - b + b * ratio
    }

    /// BM25 score of one occurrence of `term` in document `doc`.
    ///
    /// Zero for out-of-vocabulary terms and for terms absent from the document.
    pub fn term_score(&self, term: &str, doc: usize) -> f32 {
        let Some(idf) = self.idf(term) else {
            return 0.0;
        };
        let tf = self.corpus.term_frequency(doc, term);
        if tf == 0 {
            return 0.0;
        }
        let doc_len = self.corpus.document_length(doc) as f32;
        let Bm25Params { k1, b } = self.params;
        idf * bm25_tf(tf as f32, doc_len, self.corpus.avg_doc_len(), k1, b)
    }

    // Folded from +0.0 so documents without matches score exactly 0.0, never -0.0.
    fn score_tokens(&self, query_tokens: &[String], doc: usize) -> f32 {
        query_tokens
            .iter()
            .fold(0.0, |acc, term| acc + self.term_score(term, doc))
    }

    /// BM25 score of document `doc` for `query`.
    pub fn score(&self, query: &str, doc: usize) -> Result<f32, Error> {
        self.corpus.check_index(doc)?;
        Ok(self.score_tokens(&tokenize(query), doc))
    }

    /// Score every document and sort (score desc, index asc); keep `top_k` if given.
    pub fn rank(&self, query: &str, top_k: Option<usize>) -> Vec<ScoredDocument> {
        let query_tokens = tokenize(query);
        let mut results: Vec<ScoredDocument> = self
            .corpus
            .documents()
            .iter()
            .enumerate()
            .map(|(index, text)| ScoredDocument {
                index,
                text: text.clone(),
                score: self.score_tokens(&query_tokens, index),
            })
            .collect();
        sort_ranked(&mut results, top_k);
        tracing::trace!(
            query_terms = query_tokens.len(),
            results = results.len(),
            "ranked documents by bm25"
        );
        results
    }

    /// Break the score of document `doc` for `query` down by distinct query term.
    pub fn explain(&self, query: &str, doc: usize) -> Result<Explanation, Error> {
        self.corpus.check_index(doc)?;
        let query_tokens = tokenize(query);
        let length_norm = self.length_norm(doc);
        let document_length = self.corpus.document_length(doc);
        let avg_doc_length = self.corpus.avg_doc_len();

        let mut terms = Vec::new();
        for (term, query_count) in query_term_counts(&query_tokens, &self.corpus) {
            let idf = self.idf(term).unwrap_or(0.0);
            let doc_tf = self.corpus.term_frequency(doc, term);
            let term_score = self.term_score(term, doc);
            terms.push(TermContribution {
                term: term.to_string(),
                query_count,
                doc_tf,
                idf,
                length_norm,
                term_score,
                weighted_score: term_score * query_count as f32,
            });
        }
        let total_score = terms.iter().fold(0.0, |acc, t| acc + t.weighted_score);

        Ok(Explanation {
            document_index: doc,
            document_length,
            avg_doc_length,
            length_ratio: document_length as f32 / avg_doc_length,
            terms,
            total_score,
        })
    }

    /// Rank the distinct in-vocabulary query terms by their mean BM25 score over
    /// the documents that contain them (documents without the term are not
    /// averaged in). Ties break by term ascending.
    pub fn top_keywords(&self, query: &str, top_k: usize) -> Vec<(String, f32)> {
        let query_tokens = tokenize(query);
        let mut keywords: Vec<(String, f32)> = Vec::new();
        for (term, _) in query_term_counts(&query_tokens, &self.corpus) {
            let mut total = 0.0f32;
            let mut matched = 0u32;
            for doc in 0..self.corpus.num_docs() {
                if self.corpus.term_frequency(doc, term) > 0 {
                    total += self.term_score(term, doc);
                    matched += 1;
                }
            }
            if matched > 0 {
                keywords.push((term.to_string(), total / matched as f32));
            }
        }
        keywords.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        keywords.truncate(top_k);
        keywords
    }

    /// Corpus summary plus the active parameters.
    pub fn statistics(&self) -> CorpusStatistics {
        CorpusStatistics {
            doc_count: self.corpus.num_docs(),
            vocabulary_size: self.corpus.vocabulary_size(),
            avg_doc_length: self.corpus.avg_doc_len(),
            total_terms: self.corpus.total_terms(),
            min_doc_length: self.corpus.min_doc_len(),
            max_doc_length: self.corpus.max_doc_len(),
            k1: self.params.k1,
            b: self.params.b,
        }
    }
}

// In-vocabulary query terms with their repeat counts, first occurrence first.
fn query_term_counts<'a>(query_tokens: &'a [String], corpus: &Corpus) -> Vec<(&'a str, u32)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(&str, u32)> = Vec::new();
    for token in query_tokens {
        if !corpus.contains(token) {
            continue;
        }
        match slots.get(token.as_str()) {
            Some(&slot) => out[slot].1 += 1,
            None => {
                slots.insert(token.as_str(), out.len());
                out.push((token.as_str(), 1));
            }
        }
    }
    out
}

/// BM25 ranking engine.
///
/// Parameters are fixed at construction. `fit` builds a new [`Bm25Model`] and
/// swaps it in; the engine can be shared across threads (`&self` everywhere).
#[derive(Debug)]
pub struct Bm25Ranker {
    params: Bm25Params,
    model: Snapshot<Bm25Model>,
}

impl Default for Bm25Ranker {
    fn default() -> Self {
        Self {
            params: Bm25Params::default(),
            model: Snapshot::new(),
        }
    }
}

impl Bm25Ranker {
    /// Create an unfitted ranker, rejecting invalid parameters.
    pub fn new(params: Bm25Params) -> Result<Self, Error> {
        if let Err(e) = params.validate() {
            tracing::warn!(k1 = params.k1, b = params.b, error = %e, "rejected bm25 parameters");
            return Err(e);
        }
        Ok(Self {
            params,
            model: Snapshot::new(),
        })
    }

    /// Active parameters.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Fit on `documents`, replacing any previous corpus.
    ///
    /// On error the previously fitted model (if any) stays in place.
    pub fn fit<I, S>(&self, documents: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Bm25Model::fit(documents, self.params)?;
        tracing::debug!(
            docs = model.corpus.num_docs(),
            vocabulary = model.corpus.vocabulary_size(),
            avg_doc_len = model.corpus.avg_doc_len(),
            "fitted bm25 ranker"
        );
        self.model.store(model);
        Ok(())
    }

    /// Whether a corpus has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }

    /// The currently fitted model.
    pub fn model(&self) -> Result<Arc<Bm25Model>, Error> {
        self.model.load()
    }

    /// Rank all documents for `query`, optionally keeping only `top_k`.
    pub fn rank(&self, query: &str, top_k: Option<usize>) -> Result<Vec<ScoredDocument>, Error> {
        Ok(self.model.load()?.rank(query, top_k))
    }

    /// [`Self::rank`] with the default result count.
    pub fn search(&self, query: &str) -> Result<Vec<ScoredDocument>, Error> {
        self.rank(query, Some(config::DEFAULT_SEARCH_TOP_K))
    }

    /// BM25 score of a single document.
    pub fn score(&self, query: &str, doc_index: usize) -> Result<f32, Error> {
        self.model.load()?.score(query, doc_index)
    }

    /// Per-term score breakdown for one document.
    pub fn explain(&self, query: &str, doc_index: usize) -> Result<Explanation, Error> {
        self.model.load()?.explain(query, doc_index)
    }

    /// Query terms ranked by mean BM25 contribution.
    pub fn top_keywords(&self, query: &str, top_k: usize) -> Result<Vec<(String, f32)>, Error> {
        Ok(self.model.load()?.top_keywords(query, top_k))
    }

    /// Summary of the fitted corpus.
    pub fn corpus_statistics(&self) -> Result<CorpusStatistics, Error> {
        Ok(self.model.load()?.statistics())
    }
}
