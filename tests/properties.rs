//! Totality properties: arbitrary rows and text never panic.

use std::sync::{Arc, LazyLock};

use carx::classify::embed::TokenHashEmbedder;
use carx::classify::taxonomy::Taxonomy;
use carx::parser::causal::parse_causal_blocks;
use carx::{ClauseClassifier, Document, Page, Pipeline, Row};
use proptest::prelude::*;

static CLASSIFIER: LazyLock<ClauseClassifier> = LazyLock::new(|| {
    let taxonomy = Taxonomy::from_rows(vec![
        ("7.2", Some("Competence and training of personnel")),
        ("7.5", Some("Documented procedures and records")),
        ("8.4", Some("Control of contractors and suppliers")),
    ])
    .unwrap();
    ClauseClassifier::new(taxonomy, Arc::new(TokenHashEmbedder::default())).unwrap()
});

fn cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        prop_oneof![
            Just("Chronology".to_string()),
            Just("Cost Impact (MYR)".to_string()),
            Just("Correction Taken".to_string()),
            Just("Corrective Action".to_string()),
            Just("Accepted".to_string()),
            Just("CAR No".to_string()),
            Just("Date".to_string()),
        ]
        .prop_map(Some),
        "[ -~]{0,24}".prop_map(Some),
    ]
}

fn table() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(prop::collection::vec(cell(), 0..7).prop_map(Row::new), 0..8)
}

fn page() -> impl Strategy<Value = Page> {
    ("(SECTION C|Causal Factor #1:|WHY1:|• |SECTION D|[ -~]{0,20}|\n){0,12}", prop::collection::vec(table(), 0..3))
        .prop_map(|(text, tables)| Page { text, tables })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn extraction_is_total(pages in prop::collection::vec(page(), 0..3)) {
        let report = Pipeline::default().run(&Document::new(pages), "DOC");
        prop_assert_eq!(report.section_a.len(), 1);
        prop_assert!(!report.section_e2.is_empty());
        for (i, r) in report.section_b1.iter().enumerate() {
            prop_assert_eq!(r.seq, i + 1);
        }
        for (i, r) in report.section_c.iter().enumerate() {
            prop_assert_eq!(r.seq, i + 1);
        }
    }

    #[test]
    fn causal_blocks_never_empty(text in "(Causal Factor #[0-9]:|Root Cause Analysis|WHY ?[0-9]|Why-[0-9]|•|●|[ -~]{0,16}|\n){0,20}") {
        for block in parse_causal_blocks(&text) {
            prop_assert!(!block.why_chain.is_empty());
            for step in &block.why_chain {
                prop_assert!(!step.answers.is_empty());
            }
        }
    }

    #[test]
    fn classify_is_total_and_bounded(text in "\\PC{0,80}") {
        let r = CLASSIFIER.classify(&text);
        prop_assert!((0.0..=100.0).contains(&r.cosine_similarity_pct));
        prop_assert!(r.distance_pct >= 0.0);
        prop_assert_eq!(&r, &CLASSIFIER.classify(&text));
    }
}
