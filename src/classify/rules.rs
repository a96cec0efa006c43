//! Keyword rules: a regex hit boosts a fixed set of clause ids.

use std::sync::LazyLock;

use regex::Regex;

/// One ordered keyword rule.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub pattern: Regex,
    pub clauses: Vec<String>,
}

impl KeywordRule {
    pub fn new(pattern: &str, clauses: &[&str]) -> Result<Self, regex::Error> {
        Ok(KeywordRule {
            pattern: Regex::new(pattern)?,
            clauses: clauses.iter().map(|c| c.to_string()).collect(),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

const RULE_TABLE: &[(&str, &[&str])] = &[
    (r"(?i)\b(train(ing|ed)?|competen(ce|cy|t)|skill|qualif(ied|ication))", &["7.2"]),
    (r"(?i)\b(procedure|sop|work instruction|document(ation|ed)?)", &["7.5", "8.1"]),
    (r"(?i)\b(communicat(e|ion|ed)|brief(ing|ed)?|handover|toolbox talk)", &["7.4"]),
    (
        r"(?i)\b(maint(enance|ain(ed)?)|inspect(ion|ed)?|calibrat(e|ion|ed)|equipment)",
        &["7.1.3", "7.1.5"],
    ),
    (r"(?i)\b(supervis(e|ion|or)|monitor(ing|ed)?|oversight)", &["9.1"]),
    (r"(?i)\b(risk|hazard|jsa|job safety analysis)", &["6.1"]),
    (r"(?i)\b(supplier|vendor|contractor|subcontract(or)?)", &["8.4"]),
    (r"(?i)\b(aware(ness)?|complacen(t|cy)|overlook(ed)?)", &["7.3"]),
    (r"(?i)\b(plan(ning|ned)?|schedul(e|ing|ed))", &["8.1"]),
    (r"(?i)\b(management of change|moc|modif(y|ied|ication))", &["6.3", "8.5.6"]),
];

static DEFAULT_RULES: LazyLock<Vec<KeywordRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|(pattern, clauses)| KeywordRule::new(pattern, clauses).unwrap())
        .collect()
});

/// The built-in rule set, in evaluation order.
pub fn default_rules() -> Vec<KeywordRule> {
    DEFAULT_RULES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(text: &str) -> Vec<String> {
        default_rules()
            .iter()
            .filter(|r| r.matches(text))
            .flat_map(|r| r.clauses.clone())
            .collect()
    }

    #[test]
    fn training_and_procedure() {
        assert_eq!(hits("operator not trained on the SOP"), vec!["7.2", "7.5", "8.1"]);
    }

    #[test]
    fn equipment_boosts_two_clauses() {
        assert_eq!(hits("overdue calibration"), vec!["7.1.3", "7.1.5"]);
    }

    #[test]
    fn no_match() {
        assert!(hits("the weather was fine").is_empty());
    }

    #[test]
    fn bad_custom_pattern() {
        assert!(KeywordRule::new("(unclosed", &["1"]).is_err());
    }
}
