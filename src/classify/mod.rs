//! Clause classification: embedding cosine, keyword rules and fuzzy matching
//! summed per clause, best total wins.

pub mod embed;
pub mod fuzzy;
pub mod rules;
pub mod taxonomy;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EmbedError, TaxonomyError};
use embed::Embedder;
use rules::KeywordRule;
use taxonomy::Taxonomy;

pub const KEYWORD_BOOST: f64 = 0.1;
pub const FUZZY_THRESHOLD: f64 = 70.0;
pub const FUZZY_WEIGHT: f64 = 0.5;
pub const DEFAULT_CLAUSE: &str = "10.2";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub clause_id: String,
    pub cosine_similarity_pct: f64,
    #[serde(rename = "euclidean_distance_pct")]
    pub distance_pct: f64,
}

/// Scores text against a taxonomy whose entry embeddings are computed once,
/// at construction. Read-only afterwards, so one instance serves all threads.
pub struct ClauseClassifier {
    taxonomy: Taxonomy,
    details: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    dim: usize,
    embedder: Arc<dyn Embedder>,
    rules: Vec<KeywordRule>,
    default_clause: String,
}

impl ClauseClassifier {
    pub fn new(taxonomy: Taxonomy, embedder: Arc<dyn Embedder>) -> Result<Self, TaxonomyError> {
        let details: Vec<String> = taxonomy
            .entries()
            .iter()
            .map(|e| e.detail.to_lowercase())
            .collect();
        let embeddings = embedder.embed_batch(&details)?;
        if embeddings.len() != details.len() {
            return Err(EmbedError::Shape(format!(
                "{} embeddings for {} clauses",
                embeddings.len(),
                details.len()
            ))
            .into());
        }
        let dim = embeddings.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(EmbedError::Shape("empty clause embedding".into()).into());
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
            return Err(EmbedError::Dimension { expected: dim, got: bad.len() }.into());
        }
        info!(clauses = details.len(), dim, "classifier ready");
        Ok(ClauseClassifier {
            taxonomy,
            details,
            embeddings,
            dim,
            embedder,
            rules: rules::default_rules(),
            default_clause: DEFAULT_CLAUSE.to_string(),
        })
    }

    /// Replace the keyword rules. Ids missing from the taxonomy are ignored.
    pub fn with_rules(mut self, rules: Vec<KeywordRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_default_clause(mut self, clause_id: impl Into<String>) -> Self {
        self.default_clause = clause_id.into();
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn default_clause(&self) -> &str {
        &self.default_clause
    }

    fn fallback(&self) -> ClassificationResult {
        ClassificationResult {
            clause_id: self.default_clause.clone(),
            cosine_similarity_pct: 0.0,
            distance_pct: 100.0,
        }
    }

    /// Classify one statement. Never fails: embedding errors are logged and
    /// give the default clause.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.try_classify(text).unwrap_or_else(|e| {
            warn!(error = %e, "embedding failed, using default clause");
            self.fallback()
        })
    }

    /// Like [`classify`](Self::classify) but surfaces embedding errors.
    pub fn try_classify(&self, text: &str) -> Result<ClassificationResult, EmbedError> {
        let input = text.trim().to_lowercase();
        if input.is_empty() {
            return Ok(self.fallback());
        }
        let v = self.embedder.embed(&input)?;
        if v.len() != self.dim {
            return Err(EmbedError::Dimension { expected: self.dim, got: v.len() });
        }

        let scores = self.score(&input, &v);
        let Some(best) = argmax(&scores) else {
            debug!("no signal for input, using default clause");
            return Ok(self.fallback());
        };
        let winner = &self.embeddings[best];
        Ok(ClassificationResult {
            clause_id: self.taxonomy.entries()[best].clause_id.clone(),
            cosine_similarity_pct: round2((cosine(&v, winner) * 100.0).clamp(0.0, 100.0)),
            distance_pct: round2(euclidean(&v, winner) / (self.dim as f64).sqrt() * 100.0),
        })
    }

    /// Per-entry totals in taxonomy order: cosine, plus `KEYWORD_BOOST` per
    /// rule hit, plus `ratio / 100 * FUZZY_WEIGHT` when the fuzzy ratio
    /// reaches `FUZZY_THRESHOLD`. `None` means no signal touched the entry.
    fn score(&self, input: &str, v: &[f32]) -> Vec<Option<f64>> {
        let mut scores: Vec<Option<f64>> = if norm(v) > 0.0 {
            self.embeddings.iter().map(|e| Some(cosine(v, e))).collect()
        } else {
            vec![None; self.embeddings.len()]
        };

        for rule in self.rules.iter().filter(|r| r.matches(input)) {
            for pos in rule.clauses.iter().filter_map(|id| self.taxonomy.position(id)) {
                add(&mut scores[pos], KEYWORD_BOOST);
            }
        }

        for (i, detail) in self.details.iter().enumerate() {
            let ratio = fuzzy::token_sort_ratio(input, detail);
            if ratio >= FUZZY_THRESHOLD {
                add(&mut scores[i], ratio / 100.0 * FUZZY_WEIGHT);
            }
        }
        scores
    }
}

fn add(slot: &mut Option<f64>, boost: f64) {
    *slot = Some(slot.unwrap_or(0.0) + boost);
}

/// Index of the highest score; ties keep the earliest entry.
fn argmax(scores: &[Option<f64>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in scores.iter().enumerate() {
        if let Some(s) = *s {
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((i, s));
            }
        }
    }
    best.map(|(i, _)| i)
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt()
}

/// Cosine similarity; 0 when either side is the zero vector.
fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    dot / (na * nb)
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (*x as f64 - *y as f64).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use embed::TokenHashEmbedder;

    /// Same vector for every text, so only keyword and fuzzy signals differ.
    struct ConstEmbedder;

    impl Embedder for ConstEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Loads fine, fails for every query.
    struct FlakyEmbedder;

    impl Embedder for FlakyEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Http { url: "http://test".into(), message: "down".into() })
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }
    }

    /// Clause vectors of varying length.
    struct RaggedEmbedder;

    impl Embedder for RaggedEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![1.0; text.len()])
        }
    }

    fn small_taxonomy() -> Taxonomy {
        Taxonomy::from_rows(vec![
            ("7.2", Some("Competence of personnel")),
            ("8.4", Some("Control of externally provided processes")),
            ("7.1.3", Some("Infrastructure and equipment maintenance")),
        ])
        .unwrap()
    }

    fn hashed() -> ClauseClassifier {
        ClauseClassifier::new(small_taxonomy(), Arc::new(TokenHashEmbedder::default())).unwrap()
    }

    #[test]
    fn clause_embeddings_computed_at_load() {
        let c = hashed();
        assert_eq!(c.dimension(), embed::TOKEN_HASH_DIM);
        assert_eq!(c.taxonomy().len(), 3);
    }

    #[test]
    fn empty_input_gives_default() {
        let c = hashed();
        for text in ["", "   ", "\n\t"] {
            let r = c.classify(text);
            assert_eq!(r.clause_id, DEFAULT_CLAUSE);
            assert_eq!(r.cosine_similarity_pct, 0.0);
            assert_eq!(r.distance_pct, 100.0);
        }
    }

    #[test]
    fn no_tokens_no_signal_gives_default() {
        let r = hashed().classify("-- ?? --");
        assert_eq!(r.clause_id, DEFAULT_CLAUSE);
    }

    #[test]
    fn deterministic() {
        let c = hashed();
        let a = c.classify("Equipment maintenance overdue on pump");
        let b = c.classify("Equipment maintenance overdue on pump");
        assert_eq!(a, b);
        assert_eq!(a.clause_id, "7.1.3");
        assert!((0.0..=100.0).contains(&a.cosine_similarity_pct));
        assert!(a.distance_pct >= 0.0);
    }

    #[test]
    fn keyword_boost_decides_on_flat_cosine() {
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(ConstEmbedder)).unwrap();
        let r = c.classify("Contractor crew unfamiliar with site");
        assert_eq!(r.clause_id, "8.4");
        assert_eq!(r.cosine_similarity_pct, 100.0);
        assert_eq!(r.distance_pct, 0.0);
    }

    #[test]
    fn fuzzy_boost_decides_on_flat_cosine() {
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(ConstEmbedder))
            .unwrap()
            .with_rules(Vec::new());
        let r = c.classify("equipment maintenance and infrastructure");
        assert_eq!(r.clause_id, "7.1.3");
    }

    fn flat(rows: Vec<(&str, Option<&str>)>, rules: Vec<KeywordRule>) -> ClauseClassifier {
        ClauseClassifier::new(Taxonomy::from_rows(rows).unwrap(), Arc::new(ConstEmbedder))
            .unwrap()
            .with_rules(rules)
    }

    fn totals(c: &ClauseClassifier, text: &str) -> Vec<f64> {
        let v = ConstEmbedder.embed(text).unwrap();
        c.score(text, &v).into_iter().map(|s| s.unwrap()).collect()
    }

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-9, "got {got:?}, want {want:?}");
        }
    }

    #[test]
    fn keyword_hits_add_a_tenth_each_on_top_of_cosine() {
        let rules = vec![
            KeywordRule::new("(?i)alpha", &["7.2"]).unwrap(),
            KeywordRule::new("(?i)beta", &["7.2", "8.4"]).unwrap(),
        ];
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(ConstEmbedder))
            .unwrap()
            .with_rules(rules);
        assert_close(&totals(&c, "alpha beta"), &[1.2, 1.1, 1.0]);
        assert_eq!(c.classify("alpha beta").clause_id, "7.2");
    }

    #[test]
    fn fuzzy_boost_starts_at_seventy() {
        let c = flat(vec![("1", Some("abcdefg")), ("2", Some("abcdefghi"))], Vec::new());
        // 13 chars against 7: ratio exactly 70. Against 9: 1800/22.
        assert_close(&totals(&c, "abcdefghijklm"), &[1.35, 1.0 + 9.0 / 22.0]);
        // 17 chars against 9: ratio 69.23, no boost anywhere.
        assert_close(&totals(&c, "abcdefghijklmnopq"), &[1.0, 1.0]);
    }

    #[test]
    fn fuzzy_weight_is_half_the_ratio() {
        // Fuzzy on "1" gives 0.35; three keyword hits on "2" give 0.30.
        let rules = (0..3)
            .map(|_| KeywordRule::new("(?i)abc", &["2"]).unwrap())
            .collect();
        let c = flat(vec![("1", Some("abcdefg")), ("2", Some("zzz"))], rules);
        assert_close(&totals(&c, "abcdefghijklm"), &[1.35, 1.3]);
        assert_eq!(c.classify("abcdefghijklm").clause_id, "1");

        // A fourth hit tips it the other way.
        let rules = (0..4)
            .map(|_| KeywordRule::new("(?i)abc", &["2"]).unwrap())
            .collect();
        let c = flat(vec![("1", Some("abcdefg")), ("2", Some("zzz"))], rules);
        assert_eq!(c.classify("abcdefghijklm").clause_id, "2");
    }

    #[test]
    fn tie_goes_to_first_entry() {
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(ConstEmbedder))
            .unwrap()
            .with_rules(Vec::new());
        assert_eq!(c.classify("weather").clause_id, "7.2");
    }

    #[test]
    fn unknown_rule_ids_ignored() {
        let rule = KeywordRule::new("(?i)weather", &["99.9", "8.4"]).unwrap();
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(ConstEmbedder))
            .unwrap()
            .with_rules(vec![rule]);
        assert_eq!(c.classify("bad weather").clause_id, "8.4");
    }

    #[test]
    fn custom_default_clause() {
        let c = hashed().with_default_clause("0.0");
        assert_eq!(c.classify("").clause_id, "0.0");
        assert_eq!(c.default_clause(), "0.0");
    }

    #[test]
    fn query_embedding_failure_falls_back() {
        let c = ClauseClassifier::new(small_taxonomy(), Arc::new(FlakyEmbedder)).unwrap();
        assert!(c.try_classify("anything").is_err());
        assert_eq!(c.classify("anything").clause_id, DEFAULT_CLAUSE);
    }

    #[test]
    fn ragged_clause_embeddings_rejected() {
        let err = ClauseClassifier::new(small_taxonomy(), Arc::new(RaggedEmbedder)).err();
        assert!(matches!(
            err,
            Some(TaxonomyError::Embedding(EmbedError::Dimension { .. }))
        ));
    }

    #[test]
    fn argmax_prefers_first_on_tie_and_skips_none() {
        assert_eq!(argmax(&[None, Some(0.5), Some(0.5)]), Some(1));
        assert_eq!(argmax(&[None, None]), None);
        assert_eq!(argmax(&[Some(-0.2), Some(-0.1)]), Some(1));
    }

    #[test]
    fn result_serializes_distance_name() {
        let json = serde_json::to_value(hashed().classify("")).unwrap();
        assert_eq!(json["euclidean_distance_pct"], 100.0);
        assert_eq!(json["clause_id"], DEFAULT_CLAUSE);
    }
}
