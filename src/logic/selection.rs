use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::logic::{RelationSearchPicker, ResolvedRelation};
use crate::model::{CandidateEntity, Id};
use crate::store::traits::RecordStore;
use crate::store::RecordCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Field-level update on the owning record (to-one)
    PersistField,
    /// Update of the selected record's reverse field (to-many)
    UpdateOneRecord,
}

/// The one mutation a selection results in
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionMutation {
    PersistField {
        object_name: String,
        record_id: Id,
        field_name: String,
        value: Value,
    },
    UpdateOneRecord {
        object_name: String,
        id_to_update: Id,
        update_input: Map<String, Value>,
    },
}

impl SelectionMutation {
    /// Build the mutation for a selected candidate. `None` when there is no
    /// candidate id, or for to-many relations whose reverse field is unknown.
    pub fn plan(
        relation: &ResolvedRelation,
        owning_object: &str,
        owning_record_id: &Id,
        candidate: Option<&CandidateEntity>,
        cache: &RecordCache,
    ) -> Option<Self> {
        let candidate = candidate?;
        let candidate_id = candidate.id.clone().filter(|id| !id.is_empty())?;

        if relation.is_to_one() {
            let mut value = candidate.record.to_value();
            if let Value::Object(object) = &mut value {
                object.insert("id".to_string(), Value::String(candidate_id));
            }
            return Some(SelectionMutation::PersistField {
                object_name: owning_object.to_string(),
                record_id: owning_record_id.clone(),
                field_name: relation.field.field_name.clone(),
                value,
            });
        }

        let reverse_field_name = relation.reverse_field_name.clone()?;
        let foreign_key = relation.reverse_foreign_key()?;
        let owning_payload = cache
            .get(owning_record_id)
            .map(|record| record.to_value())
            .unwrap_or_else(|| json!({ "id": owning_record_id }));

        let mut update_input = Map::new();
        update_input.insert(foreign_key, Value::String(owning_record_id.clone()));
        update_input.insert(reverse_field_name, owning_payload);

        Some(SelectionMutation::UpdateOneRecord {
            object_name: relation.target.name_singular.clone(),
            id_to_update: candidate_id,
            update_input,
        })
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            SelectionMutation::PersistField { .. } => MutationKind::PersistField,
            SelectionMutation::UpdateOneRecord { .. } => MutationKind::UpdateOneRecord,
        }
    }

    /// Issue the mutation and upsert the returned record into the cache.
    /// Failures are logged and leave the cache untouched.
    pub async fn execute<S>(self, store: &S, cache: &RecordCache)
    where
        S: RecordStore + ?Sized,
    {
        let result = match self {
            SelectionMutation::PersistField {
                object_name,
                record_id,
                field_name,
                value,
            } => store.persist_field(&object_name, &record_id, &field_name, value).await,
            SelectionMutation::UpdateOneRecord {
                object_name,
                id_to_update,
                update_input,
            } => store.update_one_record(&object_name, &id_to_update, update_input).await,
        };

        match result {
            Ok(record) => cache.upsert(record),
            Err(e) => log::warn!("relation mutation failed: {}", e),
        }
    }
}

/// What a selection did. `handle` resolves once the mutation has finished.
#[derive(Debug)]
pub struct SelectionOutcome {
    pub picker_closed: bool,
    pub mutation: Option<MutationKind>,
    pub handle: Option<JoinHandle<()>>,
}

impl SelectionOutcome {
    fn closed_only() -> Self {
        Self {
            picker_closed: true,
            mutation: None,
            handle: None,
        }
    }

    /// Wait for the background mutation, if any
    pub async fn settled(self) {
        if let Some(handle) = self.handle {
            if let Err(e) = handle.await {
                log::warn!("relation mutation task aborted: {}", e);
            }
        }
    }
}

pub struct SelectionDispatcher;

impl SelectionDispatcher {
    /// Close the picker, then fire the mutation on a background task.
    ///
    /// The picker is closed before the mutation is even issued, whatever its
    /// outcome. Outside a tokio runtime the mutation is dropped with a warning.
    pub fn select<S>(
        store: &Arc<S>,
        cache: &Arc<RecordCache>,
        picker: &RelationSearchPicker,
        relation: &ResolvedRelation,
        owning_object: &str,
        owning_record_id: &Id,
        candidate: Option<&CandidateEntity>,
    ) -> SelectionOutcome
    where
        S: RecordStore + ?Sized + 'static,
    {
        picker.close();

        let planned =
            SelectionMutation::plan(relation, owning_object, owning_record_id, candidate, cache);
        let Some(mutation) = planned else {
            log::debug!("selection on {} ignored", relation.field.field_name);
            return SelectionOutcome::closed_only();
        };

        let kind = mutation.kind();
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!(
                    "dropping {:?} on {}.{}: {}",
                    kind,
                    owning_object,
                    relation.field.field_name,
                    e
                );
                return SelectionOutcome::closed_only();
            }
        };
        log::info!(
            "selected candidate for {}.{} via {:?}",
            owning_object,
            relation.field.field_name,
            kind
        );

        let store = Arc::clone(store);
        let cache = Arc::clone(cache);
        let handle = runtime.spawn(async move {
            mutation.execute(store.as_ref(), cache.as_ref()).await;
        });

        SelectionOutcome {
            picker_closed: true,
            mutation: Some(kind),
            handle: Some(handle),
        }
    }
}
