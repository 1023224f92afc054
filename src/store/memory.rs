use anyhow::{anyhow, Result};
use itertools::Itertools;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::logic::filter_records;
use crate::model::{
    Id, ObjectMetadata, Record, RecordFilter, SearchFilterGroup, SearchRequest, SearchResult,
};
use crate::store::traits::{
    CandidateMapper, MetadataStore, RecordStore, SearchFieldMapper, SearchStore,
};

/// In-memory implementation of every collaborator the relation card needs.
///
/// Records are kept per collection in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: RwLock<HashMap<String, ObjectMetadata>>,
    records: RwLock<HashMap<String, Vec<Record>>>,
    search_fields: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_object(&self, metadata: ObjectMetadata) {
        let mut objects = self.objects.write();
        objects.insert(metadata.name_singular.clone(), metadata);
    }

    /// Insert or replace a record in a collection
    pub fn insert_record(&self, object_name: &str, record: Record) {
        let mut records = self.records.write();
        let collection = records.entry(object_name.to_string()).or_default();
        match collection.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => collection.push(record),
        }
    }

    pub fn set_search_fields(&self, object_name: &str, field_names: Vec<String>) {
        let mut search_fields = self.search_fields.write();
        search_fields.insert(object_name.to_string(), field_names);
    }

    pub fn record_count(&self, object_name: &str) -> usize {
        let records = self.records.read();
        records.get(object_name).map(Vec::len).unwrap_or(0)
    }

    fn collection(&self, object_name: &str) -> Vec<Record> {
        let records = self.records.read();
        records.get(object_name).cloned().unwrap_or_default()
    }

    /// Foreign-key column kept alongside a to-one relation field
    fn foreign_key_field(&self, object_name: &str, field_name: &str) -> Option<String> {
        let objects = self.objects.read();
        let field = objects.get(object_name)?.get_field(field_name)?;
        let relation = field.relation.as_ref()?;
        relation
            .relation_type
            .is_to_one()
            .then(|| format!("{}Id", field_name))
    }

    fn apply_to_record(
        &self,
        object_name: &str,
        id: &Id,
        update_input: &Map<String, Value>,
    ) -> Result<Record> {
        let mut records = self.records.write();
        let record = records
            .get_mut(object_name)
            .and_then(|collection| collection.iter_mut().find(|record| &record.id == id))
            .ok_or_else(|| anyhow!("Record {} not found in {}", id, object_name))?;

        record.apply_update(update_input);
        Ok(record.clone())
    }
}

/// Text filter for search: every non-empty group must match on at least
/// one of its fields. A group with no fields matches nothing.
pub fn search_text_filter(groups: &[SearchFilterGroup]) -> RecordFilter {
    let group_filters = groups
        .iter()
        .filter(|group| !group.filter_text.trim().is_empty())
        .map(|group| {
            RecordFilter::or(
                group
                    .field_names
                    .iter()
                    .map(|field| RecordFilter::contains(field.clone(), group.filter_text.trim()))
                    .collect(),
            )
        })
        .collect();
    RecordFilter::and(group_filters)
}

fn compare_field(a: &Record, b: &Record, field_name: &str) -> Ordering {
    match (a.value_of(field_name), b.value_of(field_name)) {
        (Some(Value::Number(l)), Some(Value::Number(r))) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(&r),
        (Some(Value::Null), Some(Value::Null)) | (None, None) => Ordering::Equal,
        // Records without the ordering field sort last
        (Some(Value::Null), _) | (None, _) => Ordering::Greater,
        (_, Some(Value::Null)) | (_, None) => Ordering::Less,
        (Some(l), Some(r)) => l.to_string().cmp(&r.to_string()),
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryStore {
    async fn get_object_metadata(&self, name_singular: &str) -> Result<Option<ObjectMetadata>> {
        let objects = self.objects.read();
        Ok(objects.get(name_singular).cloned())
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryStore {
    async fn find_one_record(&self, object_name: &str, id: &Id) -> Result<Option<Record>> {
        let records = self.records.read();
        Ok(records
            .get(object_name)
            .and_then(|collection| collection.iter().find(|record| &record.id == id))
            .cloned())
    }

    async fn find_many_records(
        &self,
        object_name: &str,
        filter: &RecordFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let mut matching = filter_records(self.collection(object_name), filter);
        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn update_one_record(
        &self,
        object_name: &str,
        id_to_update: &Id,
        update_input: Map<String, Value>,
    ) -> Result<Record> {
        log::debug!(
            "update_one_record {}/{} fields={:?}",
            object_name,
            id_to_update,
            update_input.keys().collect::<Vec<_>>()
        );
        self.apply_to_record(object_name, id_to_update, &update_input)
    }

    async fn persist_field(
        &self,
        object_name: &str,
        record_id: &Id,
        field_name: &str,
        value: Value,
    ) -> Result<Record> {
        let mut update_input = Map::new();
        if let Some(foreign_key) = self.foreign_key_field(object_name, field_name) {
            let target_id = value
                .get("id")
                .and_then(Value::as_str)
                .map(|id| Value::String(id.to_string()))
                .unwrap_or(Value::Null);
            update_input.insert(foreign_key, target_id);
        }
        update_input.insert(field_name.to_string(), value);

        log::debug!("persist_field {}/{}.{}", object_name, record_id, field_name);
        self.apply_to_record(object_name, record_id, &update_input)
    }
}

#[async_trait::async_trait]
impl SearchStore for InMemoryStore {
    async fn search_records(
        &self,
        object_name: &str,
        request: &SearchRequest,
        mapper: CandidateMapper<'_>,
    ) -> Result<SearchResult> {
        let text_filter = search_text_filter(&request.filter_groups);
        let hidden_ids: Vec<Id> = request
            .selected_ids
            .iter()
            .chain(request.excluded_ids.iter())
            .unique()
            .cloned()
            .collect();

        let collection = self.collection(object_name);

        let selected_filter = RecordFilter::id_in(&request.selected_ids);
        let selected_entities = filter_records(collection.clone(), &selected_filter)
            .iter()
            .map(mapper)
            .collect();

        let to_select_filter =
            RecordFilter::and(vec![text_filter, RecordFilter::id_not_in(&hidden_ids)]);
        let entities_to_select = filter_records(collection, &to_select_filter)
            .into_iter()
            .sorted_by(|a, b| compare_field(a, b, &request.order_by))
            .take(request.limit)
            .map(|record| mapper(&record))
            .collect();

        Ok(SearchResult {
            entities_to_select,
            selected_entities,
            loading: false,
        })
    }
}

impl SearchFieldMapper for InMemoryStore {
    fn search_field_names(&self, object_name: &str) -> Option<Vec<String>> {
        let search_fields = self.search_fields.read();
        search_fields.get(object_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CandidateEntity;
    use crate::seed::demo_object_metadata;
    use serde_json::json;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        for metadata in demo_object_metadata() {
            store.register_object(metadata);
        }
        store.insert_record(
            "person",
            Record::new("p1")
                .with_field("name", json!("Ada"))
                .with_field("createdAt", json!("2024-01-02T00:00:00Z"))
                .with_field("companyId", Value::Null),
        );
        store.insert_record(
            "person",
            Record::new("p2")
                .with_field("name", json!("Grace"))
                .with_field("createdAt", json!("2024-01-01T00:00:00Z"))
                .with_field("companyId", json!("c1")),
        );
        store.insert_record("company", Record::new("c1").with_field("name", json!("Acme")));
        store
    }

    fn plain_mapper(record: &Record) -> CandidateEntity {
        CandidateEntity {
            id: Some(record.id.clone()),
            name: record.string_field("name").unwrap_or_default().to_string(),
            avatar_url: None,
            record: record.clone(),
        }
    }

    #[tokio::test]
    async fn test_insert_replaces_existing_record() {
        let store = store();
        store.insert_record("company", Record::new("c1").with_field("name", json!("Acme Corp")));
        assert_eq!(store.record_count("company"), 1);

        let company = store.find_one_record("company", &"c1".to_string()).await.unwrap().unwrap();
        assert_eq!(company.string_field("name"), Some("Acme Corp"));
    }

    #[tokio::test]
    async fn test_persist_relation_field_sets_foreign_key() {
        let store = store();
        let updated = store
            .persist_field(
                "person",
                &"p1".to_string(),
                "company",
                json!({"id": "c1", "name": "Acme"}),
            )
            .await
            .unwrap();

        assert_eq!(updated.get("companyId"), Some(&json!("c1")));
        assert_eq!(updated.get("company"), Some(&json!({"id": "c1", "name": "Acme"})));
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let store = store();
        let result = store
            .update_one_record("person", &"nobody".to_string(), Map::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_orders_and_excludes() {
        let store = store();
        let request = SearchRequest {
            filter_groups: vec![SearchFilterGroup {
                field_names: vec!["name".to_string()],
                filter_text: String::new(),
            }],
            order_by: "createdAt".to_string(),
            selected_ids: Vec::new(),
            excluded_ids: Vec::new(),
            limit: 10,
        };
        let result = store.search_records("person", &request, &plain_mapper).await.unwrap();
        let ids: Vec<_> = result.entities_to_select.iter().filter_map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);

        let request = SearchRequest {
            excluded_ids: vec!["p2".to_string()],
            ..request
        };
        let result = store.search_records("person", &request, &plain_mapper).await.unwrap();
        let ids: Vec<_> = result.entities_to_select.iter().filter_map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_search_text_without_fields_matches_nothing() {
        let store = store();
        let request = SearchRequest {
            filter_groups: vec![SearchFilterGroup {
                field_names: Vec::new(),
                filter_text: "Ada".to_string(),
            }],
            order_by: "createdAt".to_string(),
            selected_ids: vec!["p2".to_string()],
            excluded_ids: Vec::new(),
            limit: 10,
        };
        let result = store.search_records("person", &request, &plain_mapper).await.unwrap();
        assert!(result.entities_to_select.is_empty());
        assert_eq!(result.selected_entities.len(), 1);
    }
}
