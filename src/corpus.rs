//! Corpus statistics: the fitted, read-only view every scorer is built on.
//!
//! A [`Corpus`] is produced once by [`Corpus::fit`] and never mutated afterward.
//! Document `i` is `documents[i]` for the lifetime of the value; re-fitting
//! means building a new `Corpus`, not editing this one.

use crate::tokenize::tokenize;
use crate::Error;
use std::collections::HashMap;

/// Fitted corpus statistics.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<String>,
    doc_lengths: Vec<u32>,
    term_freqs: Vec<HashMap<String, u32>>,
    // term -> number of documents containing it; keys are the vocabulary.
    doc_freqs: HashMap<String, u32>,
    total_terms: u64,
    avg_doc_len: f32,
}

impl Corpus {
    /// Tokenize `documents` and compute lengths, term frequencies, document
    /// frequencies and the average document length.
    ///
    /// Fails with [`Error::EmptyCorpus`] when there are no documents, or when no
    /// document yields a single token (the average length would be zero), and
    /// with [`Error::CorpusTooLarge`] when a count overflows `u32`.
    pub fn fit<I, S>(documents: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents: Vec<String> = documents.into_iter().map(Into::into).collect();
        if documents.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if u32::try_from(documents.len()).is_err() {
            return Err(Error::CorpusTooLarge("more than u32::MAX documents"));
        }

        let mut doc_lengths = Vec::with_capacity(documents.len());
        let mut term_freqs = Vec::with_capacity(documents.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_terms: u64 = 0;

        for doc in &documents {
            let tokens = tokenize(doc);
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lengths.push(token_count(tokens.len())?);
            total_terms += tokens.len() as u64;
            term_freqs.push(tf);
        }

        if total_terms == 0 {
            return Err(Error::EmptyCorpus);
        }
        let avg_doc_len = mean_length(total_terms, documents.len());

        Ok(Self {
            documents,
            doc_lengths,
            term_freqs,
            doc_freqs,
            total_terms,
            avg_doc_len,
        })
    }

    /// Number of documents.
    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    /// Raw document texts, in corpus order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Raw text of document `doc`, if it exists.
    pub fn document(&self, doc: usize) -> Option<&str> {
        self.documents.get(doc).map(String::as_str)
    }

    /// Fail with [`Error::IndexOutOfRange`] unless `doc` addresses a document.
    pub fn check_index(&self, doc: usize) -> Result<(), Error> {
        if doc < self.documents.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: doc,
                doc_count: self.documents.len(),
            })
        }
    }

    /// Token count of document `doc` (0 for unknown indices).
    pub fn document_length(&self, doc: usize) -> u32 {
        self.doc_lengths.get(doc).copied().unwrap_or(0)
    }

    /// Per-document token counts, in corpus order.
    pub fn document_lengths(&self) -> &[u32] {
        &self.doc_lengths
    }

    /// Arithmetic mean of the document lengths. Always `> 0`.
    pub fn avg_doc_len(&self) -> f32 {
        self.avg_doc_len
    }

    /// Sum of all document lengths.
    pub fn total_terms(&self) -> u64 {
        self.total_terms
    }

    /// Occurrences of `term` in document `doc` (0 if absent or doc unknown).
    pub fn term_frequency(&self, doc: usize, term: &str) -> u32 {
        self.term_freqs
            .get(doc)
            .and_then(|tf| tf.get(term))
            .copied()
            .unwrap_or(0)
    }

    /// Number of documents containing `term` at least once.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Whether `term` is in the vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.doc_freqs.contains_key(term)
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freqs.len()
    }

    /// Iterate `(term, doc_frequency)` over the vocabulary, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.doc_freqs.iter().map(|(t, &df)| (t.as_str(), df))
    }

    /// Smallest document length.
    pub fn min_doc_len(&self) -> u32 {
        self.doc_lengths.iter().copied().min().unwrap_or(0)
    }

    /// Largest document length.
    pub fn max_doc_len(&self) -> u32 {
        self.doc_lengths.iter().copied().max().unwrap_or(0)
    }
}

fn token_count(len: usize) -> Result<u32, Error> {
    u32::try_from(len)
        .map_err(|_| Error::CorpusTooLarge("more than u32::MAX tokens in a document"))
}

// Divided in f64; narrowing first would round large totals before the division.
fn mean_length(total_terms: u64, num_docs: usize) -> f32 {
    (total_terms as f64 / num_docs as f64) as f32
}
