use serde::Serialize;

use crate::logic::ResolvedRelation;
use crate::model::{Id, Record, RecordFilter, RelationFieldValue};
use crate::store::traits::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Target schema has no label identifier; nothing would be rendered
    TargetNotDisplayable,
    /// To-one field is null on the owning record
    EmptyRelationValue,
    /// To-many relation whose reverse field is not in the target schema
    UnknownReverseField,
}

/// The single fetch issued for one relation field
#[derive(Debug, Clone, PartialEq)]
pub enum RelationFetchPlan {
    FindOne { object_name: String, record_id: Id },
    FindMany { object_name: String, filter: RecordFilter },
    Skip(SkipReason),
}

impl RelationFetchPlan {
    /// Decide which fetch applies. Cardinality picks the branch, so at most
    /// one of the two fetches is ever planned.
    pub fn plan(
        relation: &ResolvedRelation,
        owning_record_id: &Id,
        owning_record: Option<&Record>,
    ) -> Self {
        if relation.is_to_one() {
            if !relation.is_displayable() {
                return RelationFetchPlan::Skip(SkipReason::TargetNotDisplayable);
            }
            let field_name = &relation.field.field_name;
            match owning_record.and_then(|record| RelationFieldValue::read(record, field_name)) {
                Some(value) => RelationFetchPlan::FindOne {
                    object_name: relation.target.name_singular.clone(),
                    record_id: value.id,
                },
                None => RelationFetchPlan::Skip(SkipReason::EmptyRelationValue),
            }
        } else {
            match relation.reverse_foreign_key() {
                Some(foreign_key) => RelationFetchPlan::FindMany {
                    object_name: relation.target.name_singular.clone(),
                    filter: RecordFilter::eq(foreign_key, owning_record_id.clone()),
                },
                None => RelationFetchPlan::Skip(SkipReason::UnknownReverseField),
            }
        }
    }
}

pub struct RelationRecordFetcher;

impl RelationRecordFetcher {
    /// Execute a fetch plan. Not-found and store failures both come back as
    /// an empty set.
    pub async fn fetch<S>(store: &S, plan: &RelationFetchPlan) -> Vec<Record>
    where
        S: RecordStore + ?Sized,
    {
        match plan {
            RelationFetchPlan::FindOne { object_name, record_id } => {
                match store.find_one_record(object_name, record_id).await {
                    Ok(Some(record)) => vec![record],
                    Ok(None) => {
                        log::debug!("related {} record {} not found", object_name, record_id);
                        Vec::new()
                    }
                    Err(e) => {
                        log::warn!("failed to fetch {} record {}: {}", object_name, record_id, e);
                        Vec::new()
                    }
                }
            }
            RelationFetchPlan::FindMany { object_name, filter } => {
                match store.find_many_records(object_name, filter, None).await {
                    Ok(records) => records,
                    Err(e) => {
                        log::warn!("failed to fetch related {} records: {}", object_name, e);
                        Vec::new()
                    }
                }
            }
            RelationFetchPlan::Skip(reason) => {
                log::debug!("relation fetch skipped: {:?}", reason);
                Vec::new()
            }
        }
    }
}
