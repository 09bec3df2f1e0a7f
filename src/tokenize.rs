//! Text normalization shared by indexing and querying.
//!
//! The tokenizer is deliberately naive: lowercase the whole string, then split on
//! runs of Unicode whitespace. Punctuation stays attached to tokens ("cat." and
//! "cat" are different terms). No stemming, no stop words.
//!
//! Every engine in this crate calls [`tokenize`] for both documents and queries,
//! so term identity is consistent between the two sides.

/// Lowercase `text` and split it on whitespace, discarding empty fragments.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
