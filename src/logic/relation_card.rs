use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RelationCardConfig;
use crate::logic::{
    picker_scope_id, PickerCandidates, RecordCacheSynchronizer, RelationCardinality,
    RelationFetchPlan, RelationLinkBuilder, RelationRecordFetcher, RelationSearchPicker,
    ResolvedRelation, SelectionDispatcher, SelectionOutcome, ViewAllLink,
};
use crate::model::{CandidateEntity, Id, Record, RelationType};
use crate::store::traits::Store;
use crate::store::RecordCache;

#[derive(Debug, Error)]
pub enum RelationCardError {
    #[error("object '{0}' not found")]
    ObjectNotFound(String),
    #[error("field '{field}' not found on object '{object}'")]
    FieldNotFound { object: String, field: String },
    #[error("field '{field}' on object '{object}' is not a relation")]
    NotARelation { object: String, field: String },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// What the relation section renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationCardView {
    pub field_name: String,
    pub label: String,
    pub relation_type: RelationType,
    pub cardinality: RelationCardinality,
    /// Related records, capped to the display limit
    pub records: Vec<Record>,
    /// Size of the full related record set
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_all: Option<ViewAllLink>,
}

/// One relation field on one owning record, with its picker.
///
/// The owning object, record id and field are fixed at construction and
/// passed explicitly to every component underneath.
pub struct RelationFieldCard<S: ?Sized> {
    store: Arc<S>,
    cache: Arc<RecordCache>,
    config: RelationCardConfig,
    owning_object: String,
    owning_record_id: Id,
    relation: ResolvedRelation,
    synchronizer: RecordCacheSynchronizer,
    picker: RelationSearchPicker,
    records: RwLock<Vec<Record>>,
}

impl<S> RelationFieldCard<S>
where
    S: Store + ?Sized + 'static,
{
    /// Look up the relation field and its target collection
    pub async fn resolve(
        store: Arc<S>,
        cache: Arc<RecordCache>,
        config: RelationCardConfig,
        owning_object: &str,
        owning_record_id: &Id,
        field_name: &str,
    ) -> Result<Self, RelationCardError> {
        let owning_metadata = store
            .get_object_metadata(owning_object)
            .await?
            .ok_or_else(|| RelationCardError::ObjectNotFound(owning_object.to_string()))?;
        let field = owning_metadata
            .get_field(field_name)
            .ok_or_else(|| RelationCardError::FieldNotFound {
                object: owning_object.to_string(),
                field: field_name.to_string(),
            })?;
        let relation_field = field
            .relation_metadata()
            .ok_or_else(|| RelationCardError::NotARelation {
                object: owning_object.to_string(),
                field: field_name.to_string(),
            })?;
        let target_name = relation_field.relation_object_name.clone();
        let target = store
            .get_object_metadata(&target_name)
            .await?
            .ok_or(RelationCardError::ObjectNotFound(target_name))?;

        let picker = RelationSearchPicker::new(
            picker_scope_id(owning_record_id, &relation_field.label),
            config.search_limit,
            config.search_order_by.clone(),
        );

        Ok(Self {
            store,
            cache,
            config,
            owning_object: owning_object.to_string(),
            owning_record_id: owning_record_id.clone(),
            relation: ResolvedRelation::new(relation_field, target),
            synchronizer: RecordCacheSynchronizer::new(),
            picker,
            records: RwLock::new(Vec::new()),
        })
    }

    pub fn relation(&self) -> &ResolvedRelation {
        &self.relation
    }

    pub fn picker(&self) -> &RelationSearchPicker {
        &self.picker
    }

    /// Current related record set, as of the last `load`
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// The owning record, from the cache when present, otherwise fetched and
    /// written to the cache.
    pub async fn owning_record(&self) -> Option<Record> {
        if let Some(record) = self.cache.get(&self.owning_record_id) {
            return Some(record);
        }
        match self
            .store
            .find_one_record(&self.owning_object, &self.owning_record_id)
            .await
        {
            Ok(Some(record)) => {
                self.cache.upsert(record.clone());
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!(
                    "failed to load {} record {}: {}",
                    self.owning_object,
                    self.owning_record_id,
                    e
                );
                None
            }
        }
    }

    pub async fn plan(&self) -> RelationFetchPlan {
        let owning_record = self.owning_record().await;
        RelationFetchPlan::plan(&self.relation, &self.owning_record_id, owning_record.as_ref())
    }

    /// Fetch the related records, sync them into the cache and build the
    /// view. Returns `None` when the relation is not displayable.
    pub async fn load(&self) -> Option<RelationCardView> {
        if !self.relation.is_displayable() {
            log::debug!(
                "{} has no label identifier, hiding {}",
                self.relation.target.name_singular,
                self.relation.field.field_name
            );
            self.records.write().clear();
            self.synchronizer.reset();
            return None;
        }

        let plan = self.plan().await;
        let records = RelationRecordFetcher::fetch(self.store.as_ref(), &plan).await;
        self.synchronizer.sync(&self.cache, &records);

        let count = records.len();
        let displayed = records
            .iter()
            .take(self.config.max_displayed_records)
            .cloned()
            .collect();
        *self.records.write() = records;

        Some(RelationCardView {
            field_name: self.relation.field.field_name.clone(),
            label: self.relation.field.label.clone(),
            relation_type: self.relation.field.relation_type,
            cardinality: self.relation.cardinality,
            records: displayed,
            count,
            view_all: RelationLinkBuilder::view_all(
                &self.relation,
                &self.owning_record_id,
                count,
                self.config.view_all_link,
            ),
        })
    }

    /// True when the record is in the related set of the last `load`
    pub fn is_linked(&self, record_id: &Id) -> bool {
        self.records.read().iter().any(|record| &record.id == record_id)
    }

    pub fn open_picker(&self) {
        self.picker.open();
    }

    pub fn set_search_filter(&self, text: impl Into<String>) {
        self.picker.set_search_filter(text);
    }

    pub fn close_picker(&self) {
        self.picker.close();
    }

    /// Candidates for the current search text, excluding linked records
    pub async fn candidates(&self) -> PickerCandidates {
        let linked = self.records();
        self.picker
            .candidates(self.store.as_ref(), &self.relation, &linked)
            .await
    }

    /// Link a candidate. Closes the picker first; the mutation runs in the
    /// background. Records that are already linked are never linked again.
    pub fn select(&self, candidate: Option<&CandidateEntity>) -> SelectionOutcome {
        let candidate = candidate.filter(|candidate| match &candidate.id {
            Some(id) if self.is_linked(id) => {
                log::debug!(
                    "{} is already linked through {}",
                    id,
                    self.relation.field.field_name
                );
                false
            }
            _ => true,
        });

        SelectionDispatcher::select(
            &self.store,
            &self.cache,
            &self.picker,
            &self.relation,
            &self.owning_object,
            &self.owning_record_id,
            candidate,
        )
    }
}
