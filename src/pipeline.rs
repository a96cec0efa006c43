use std::sync::Arc;

use tracing::debug;

use crate::classify::ClauseClassifier;
use crate::document::Document;
use crate::parser;
use crate::records::CarReport;

/// Extraction plus optional clause classification of Section C answers.
#[derive(Clone, Default)]
pub struct Pipeline {
    classifier: Option<Arc<ClauseClassifier>>,
}

impl Pipeline {
    pub fn new(classifier: Option<Arc<ClauseClassifier>>) -> Self {
        Pipeline { classifier }
    }

    pub fn run(&self, doc: &Document, document_id: &str) -> CarReport {
        let mut report = parser::extract_document(doc, document_id);
        self.analyze(&mut report);
        report
    }

    /// Fill the classification fields of every Section C answer. Only the
    /// answer text is scored; the causal-factor title is left out on purpose.
    /// Without a classifier the fields stay `None`.
    pub fn analyze(&self, report: &mut CarReport) {
        let Some(classifier) = &self.classifier else {
            return;
        };
        for record in &mut report.section_c {
            let result = classifier.classify(&record.answer);
            debug!(seq = record.seq, clause = %result.clause_id, "answer classified");
            record.clause_mapped = Some(result.clause_id);
            record.cosine_similarity_pct = Some(result.cosine_similarity_pct);
            record.euclidean_distance_pct = Some(result.distance_pct);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::embed::TokenHashEmbedder;
    use crate::classify::taxonomy::Taxonomy;
    use crate::records::CausalAnswerRecord;
    use std::path::Path;

    fn classifier() -> Arc<ClauseClassifier> {
        let taxonomy = Taxonomy::load(Path::new("tests/fixtures/clauses.json")).unwrap();
        Arc::new(ClauseClassifier::new(taxonomy, Arc::new(TokenHashEmbedder::default())).unwrap())
    }

    fn report_with(answers: &[&str]) -> CarReport {
        CarReport {
            document_id: "DOC".into(),
            section_c: answers
                .iter()
                .enumerate()
                .map(|(i, a)| CausalAnswerRecord {
                    seq: i + 1,
                    answer: a.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn without_classifier_fields_stay_empty() {
        let mut report = report_with(&["Operator not trained"]);
        Pipeline::default().analyze(&mut report);
        assert_eq!(report.section_c[0].clause_mapped, None);
        assert_eq!(report.section_c[0].cosine_similarity_pct, None);
    }

    #[test]
    fn every_answer_gets_a_clause() {
        let mut report = report_with(&["Operator not trained on the procedure", ""]);
        Pipeline::new(Some(classifier())).analyze(&mut report);
        for r in &report.section_c {
            assert!(r.clause_mapped.is_some());
            let cos = r.cosine_similarity_pct.unwrap();
            assert!((0.0..=100.0).contains(&cos));
            assert!(r.euclidean_distance_pct.unwrap() >= 0.0);
        }
        assert_eq!(report.section_c[1].clause_mapped.as_deref(), Some(crate::classify::DEFAULT_CLAUSE));
        assert_eq!(report.section_c[1].euclidean_distance_pct, Some(100.0));
    }

    #[test]
    fn factor_title_does_not_change_the_clause() {
        let pipeline = Pipeline::new(Some(classifier()));
        let mut bare = report_with(&["Pump seal worn out"]);
        let mut titled = bare.clone();
        titled.section_c[0].causal_factor = "Contractor training and competence".into();
        pipeline.analyze(&mut bare);
        pipeline.analyze(&mut titled);
        assert_eq!(bare.section_c[0].clause_mapped, titled.section_c[0].clause_mapped);
        assert_eq!(
            bare.section_c[0].cosine_similarity_pct,
            titled.section_c[0].cosine_similarity_pct
        );
    }

    #[test]
    fn run_is_deterministic() {
        let doc = Document::load(Path::new("tests/fixtures/car_sample.json")).unwrap();
        let pipeline = Pipeline::new(Some(classifier()));
        let a = pipeline.run(&doc, "car_sample");
        let b = pipeline.run(&doc, "car_sample");
        assert_eq!(a, b);
        assert!(a.section_c.iter().all(|r| r.clause_mapped.is_some()));
    }
}
