use serde_json::Value;

use crate::model::{FieldPredicate, Record, RecordFilter};

/// In-memory evaluator for record filters
pub struct RecordFilterEvaluator;

impl RecordFilterEvaluator {
    /// Filter a list of records based on the filter expression
    pub fn filter_records(records: Vec<Record>, filter: &RecordFilter) -> Vec<Record> {
        records
            .into_iter()
            .filter(|record| Self::evaluate_filter(record, filter))
            .collect()
    }

    /// Evaluate filter expression against a single record
    pub fn evaluate_filter(record: &Record, filter: &RecordFilter) -> bool {
        match filter {
            RecordFilter::And { and } => and.iter().all(|expr| Self::evaluate_filter(record, expr)),
            RecordFilter::Or { or } => or.iter().any(|expr| Self::evaluate_filter(record, expr)),
            RecordFilter::Field(predicates) => predicates.iter().all(|(field, predicate)| {
                Self::evaluate_predicate(record.value_of(field), predicate)
            }),
        }
    }

    fn evaluate_predicate(value: Option<Value>, predicate: &FieldPredicate) -> bool {
        match predicate {
            FieldPredicate::Eq(expected) => value.unwrap_or(Value::Null) == *expected,
            FieldPredicate::In(values) => match value {
                Some(val) => values.contains(&val),
                None => false,
            },
            // A missing field is not in the list
            FieldPredicate::NotIn(values) => match value {
                Some(val) => !values.contains(&val),
                None => true,
            },
            FieldPredicate::Ilike(pattern) => match value {
                Some(Value::String(s)) => ilike(&s, pattern),
                _ => false,
            },
        }
    }
}

/// Case-insensitive match supporting `%` at either end of the pattern
fn ilike(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase();
    let pattern = pattern.to_lowercase();

    let leading = pattern.starts_with('%');
    let trailing = pattern.len() > 1 && pattern.ends_with('%');
    let needle = pattern.trim_matches('%');

    match (leading, trailing) {
        (true, true) => value.contains(needle),
        (true, false) => value.ends_with(needle),
        (false, true) => value.starts_with(needle),
        (false, false) => value == needle,
    }
}

/// Filter records using a strongly-typed filter expression
pub fn filter_records(records: Vec<Record>, filter: &RecordFilter) -> Vec<Record> {
    RecordFilterEvaluator::filter_records(records, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> Vec<Record> {
        vec![
            Record::new("p1")
                .with_field("name", json!("Ada Lovelace"))
                .with_field("companyId", json!("c1")),
            Record::new("p2")
                .with_field("name", json!("Grace Hopper"))
                .with_field("companyId", json!("c2")),
            Record::new("p3").with_field("name", json!("Alan Turing")),
        ]
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_eq_on_foreign_key() {
        let result = filter_records(people(), &RecordFilter::eq("companyId", "c1"));
        assert_eq!(ids(&result), vec!["p1"]);
    }

    #[test]
    fn test_eq_null_matches_missing_field() {
        let result = filter_records(people(), &RecordFilter::eq("companyId", Value::Null));
        assert_eq!(ids(&result), vec!["p3"]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let result = filter_records(people(), &RecordFilter::contains("name", "HOP"));
        assert_eq!(ids(&result), vec!["p2"]);
    }

    #[test]
    fn test_id_not_in_and_or() {
        let filter = RecordFilter::and(vec![
            RecordFilter::or(vec![
                RecordFilter::contains("name", "a"),
                RecordFilter::contains("companyId", "c"),
            ]),
            RecordFilter::id_not_in(&["p1".to_string()]),
        ]);
        let result = filter_records(people(), &filter);
        assert_eq!(ids(&result), vec!["p2", "p3"]);
    }

    #[test]
    fn test_empty_or_matches_nothing() {
        let result = filter_records(people(), &RecordFilter::or(Vec::new()));
        assert!(result.is_empty());

        let result = filter_records(people(), &RecordFilter::and(Vec::new()));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_ilike_anchors() {
        assert!(ilike("Acme Corp", "acme%"));
        assert!(!ilike("Acme Corp", "corp%"));
        assert!(ilike("Acme Corp", "%corp"));
        assert!(ilike("Acme", "acme"));
        assert!(ilike("anything", "%"));
    }
}
