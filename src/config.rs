//! Default tuning values.
//!
//! These are compile-time constants. Hosts that need runtime configuration
//! deserialize [`crate::Bm25Params`] from their own config source; missing
//! fields fall back to the values below.

/// BM25 term-frequency saturation parameter.
///
/// Higher values let repeated terms keep adding score for longer.
/// Typical range: 1.2–2.0.
pub const BM25_K1: f32 = 1.2;

/// BM25 document-length normalization strength.
///
/// 0.0 disables length normalization, 1.0 normalizes fully. Standard value is 0.75.
pub const BM25_B: f32 = 0.75;

/// Result count used by [`crate::Bm25Ranker::search`].
pub const DEFAULT_SEARCH_TOP_K: usize = 10;
