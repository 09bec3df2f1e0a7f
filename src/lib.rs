//! `lexrank`: statistical document ranking over a fixed in-memory corpus.
//!
//! Two sibling scorers share one fitted view of the corpus:
//! - [`bm25`]: Okapi BM25 with the smoothed (possibly negative) IDF, ranking,
//!   per-term explanations and query keyword ranking.
//! - [`tfidf`]: plain TF-IDF vectors for arbitrary text, and [`rank::TfIdfRanker`]
//!   for cosine-similarity search over cached document vectors.
//!
//! Scope:
//! - In-memory corpora, fitted wholesale (no incremental add/delete)
//! - Deterministic ranking (score desc, then document index asc)
//! - Naive tokenization (lowercase + whitespace split), shared by documents and queries
//!
//! Non-goals:
//! - Stemming, stop words, language-aware tokenization
//! - Persistence, loading documents, serving results
//! - Embedding-based retrieval
//!
//! Fitted state lives in immutable models behind [`snapshot::Snapshot`]: a re-fit
//! builds a fresh model and swaps it in, so concurrent readers never observe a
//! half-built corpus.
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond
//! - Spärck Jones (1972): term specificity / IDF motivation

pub mod bm25;
pub mod config;
pub mod corpus;
pub mod rank;
pub mod snapshot;
pub mod tfidf;
pub mod tokenize;

pub use bm25::{Bm25Model, Bm25Params, Bm25Ranker, CorpusStatistics, Explanation, TermContribution};
pub use corpus::Corpus;
pub use error::Error;
pub use rank::{cosine_similarity, ScoredDocument, TfIdfRanker};
pub use tfidf::{TfIdfModel, TfIdfScorer, TfIdfVector};
pub use tokenize::tokenize;

mod error {
    /// Errors for corpus fitting and ranking.
    #[derive(thiserror::Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// `fit` was given no documents, or documents without a single token.
        #[error("empty corpus")]
        EmptyCorpus,
        /// A scoring operation ran before any successful `fit`.
        #[error("ranker has not been fitted")]
        NotFitted,
        /// Document index outside `[0, doc_count)`.
        #[error("document index {index} out of range (corpus has {doc_count} documents)")]
        IndexOutOfRange {
            /// Requested index.
            index: usize,
            /// Documents in the fitted corpus.
            doc_count: usize,
        },
        /// Scorer parameters were invalid.
        #[error("invalid parameter: {0}")]
        InvalidParameter(&'static str),

        /// A count does not fit the `u32` statistics.
        #[error("corpus too large: {0}")]
        CorpusTooLarge(&'static str),
    }
}
