use crate::model::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Record filter tree sent to record-by-filter and search services.
///
/// Serialises to the same shape the record API accepts, e.g.
/// `{"companyId": {"eq": "c1"}}` or `{"and": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordFilter {
    And { and: Vec<RecordFilter> },
    Or { or: Vec<RecordFilter> },
    Field(BTreeMap<String, FieldPredicate>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPredicate {
    Eq(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// SQL-style case-insensitive pattern, `%` as wildcard
    Ilike(String),
}

impl RecordFilter {
    pub fn field(field_name: impl Into<String>, predicate: FieldPredicate) -> Self {
        let mut predicates = BTreeMap::new();
        predicates.insert(field_name.into(), predicate);
        RecordFilter::Field(predicates)
    }

    pub fn eq(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(field_name, FieldPredicate::Eq(value.into()))
    }

    pub fn id_in(ids: &[Id]) -> Self {
        Self::field(
            "id",
            FieldPredicate::In(ids.iter().cloned().map(Value::String).collect()),
        )
    }

    pub fn id_not_in(ids: &[Id]) -> Self {
        Self::field(
            "id",
            FieldPredicate::NotIn(ids.iter().cloned().map(Value::String).collect()),
        )
    }

    /// Substring match, case-insensitive
    pub fn contains(field_name: impl Into<String>, text: &str) -> Self {
        Self::field(field_name, FieldPredicate::Ilike(format!("%{}%", text)))
    }

    pub fn and(filters: Vec<RecordFilter>) -> Self {
        RecordFilter::And { and: filters }
    }

    pub fn or(filters: Vec<RecordFilter>) -> Self {
        RecordFilter::Or { or: filters }
    }
}

/// One text-search group: the filter text matched against any of the fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilterGroup {
    pub field_names: Vec<String>,
    pub filter_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub filter_groups: Vec<SearchFilterGroup>,
    /// Field used to order candidates, ascending
    pub order_by: String,
    /// Ids already linked; returned separately and never offered again
    pub selected_ids: Vec<Id>,
    pub excluded_ids: Vec<Id>,
    pub limit: usize,
}
