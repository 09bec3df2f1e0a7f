//! Property tests over randomly generated small corpora.

use lexrank::{cosine_similarity, Bm25Model, Bm25Params, Corpus, TfIdfRanker};
use proptest::prelude::*;

const WORDS: [&str; 8] = ["cat", "dog", "the", "ran", "sat", "mat", "Park", "tree."];

fn document() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(WORDS.to_vec()), 1..8)
        .prop_map(|words| words.join(" "))
}

fn corpus() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(document(), 1..10)
}

fn params() -> impl Strategy<Value = Bm25Params> {
    (0.1f32..3.0, 0.0f32..=1.0).prop_map(|(k1, b)| Bm25Params::new(k1, b))
}

proptest! {
    #[test]
    fn prop_avg_doc_length_is_mean(docs in corpus()) {
        let c = Corpus::fit(docs.clone()).unwrap();
        let sum: u32 = c.document_lengths().iter().sum();
        let expected = sum as f32 / docs.len() as f32;
        prop_assert!((c.avg_doc_len() - expected).abs() < 1e-5);
        prop_assert!(c.avg_doc_len() > 0.0);
    }

    #[test]
    fn prop_rank_is_sorted_permutation(docs in corpus(), query in document(), p in params()) {
        let m = Bm25Model::fit(docs.clone(), p).unwrap();
        let hits = m.rank(&query, None);
        prop_assert_eq!(hits.len(), docs.len());

        let mut indices: Vec<usize> = hits.iter().map(|h| h.index).collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..docs.len()).collect::<Vec<_>>());

        for w in hits.windows(2) {
            prop_assert!(w[0].score >= w[1].score);
            if w[0].score == w[1].score {
                prop_assert!(w[0].index < w[1].index);
            }
        }
        for h in &hits {
            prop_assert_eq!(&h.text, &docs[h.index]);
        }
    }

    #[test]
    fn prop_top_k_is_prefix(docs in corpus(), query in document(), k in 0usize..12) {
        let m = Bm25Model::fit(docs, Bm25Params::default()).unwrap();
        let all = m.rank(&query, None);
        let top = m.rank(&query, Some(k));
        let n = k.min(all.len());
        prop_assert_eq!(&top[..], &all[..n]);
    }

    #[test]
    fn prop_refit_is_deterministic(docs in corpus(), query in document()) {
        let a = Bm25Model::fit(docs.clone(), Bm25Params::default()).unwrap();
        let b = Bm25Model::fit(docs, Bm25Params::default()).unwrap();
        for (term, _) in a.corpus().terms() {
            prop_assert_eq!(a.idf(term), b.idf(term));
        }
        prop_assert_eq!(a.rank(&query, None), b.rank(&query, None));
    }

    #[test]
    fn prop_idf_sign_follows_document_frequency(docs in corpus()) {
        let m = Bm25Model::fit(docs.clone(), Bm25Params::default()).unwrap();
        let n = docs.len() as u32;
        for (term, df) in m.corpus().terms() {
            let idf = m.idf(term).unwrap();
            if df == n {
                prop_assert!(idf < 0.0, "{} df={} n={} idf={}", term, df, n, idf);
            }
            if df == 1 && n >= 3 {
                prop_assert!(idf > 0.0, "{} df={} n={} idf={}", term, df, n, idf);
            }
        }
    }

    #[test]
    fn prop_explanation_total_is_sum(docs in corpus(), query in document(), p in params()) {
        let m = Bm25Model::fit(docs.clone(), p).unwrap();
        for doc in 0..docs.len() {
            let e = m.explain(&query, doc).unwrap();
            let sum = e.terms.iter().fold(0.0f32, |acc, t| acc + t.weighted_score);
            prop_assert_eq!(e.total_score, sum);
            let direct = m.score(&query, doc).unwrap();
            prop_assert!((e.total_score - direct).abs() < 1e-3 * (1.0 + direct.abs()));
        }
    }

    #[test]
    fn prop_self_cosine_is_one(docs in corpus()) {
        let ranker = TfIdfRanker::new();
        ranker.fit(docs.clone()).unwrap();
        for doc in 0..docs.len() {
            let v = ranker.document_vector(doc).unwrap();
            let norm: f32 = v.values().map(|x| x * x).sum();
            if norm > 0.0 {
                prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-4);
            }
        }
    }
}
