#![allow(dead_code)]

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use relation_card::config::RelationCardConfig;
use relation_card::seed::load_seed_data;
use relation_card::store::{
    CandidateMapper, InMemoryStore, MetadataStore, RecordStore, SearchFieldMapper, SearchStore,
};
use relation_card::{
    Id, ObjectMetadata, Record, RecordCache, RecordFilter, RelationFieldCard, SearchRequest,
    SearchResult,
};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// One call made against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindOne { object: String, id: Id },
    FindMany { object: String, filter: Value },
    UpdateOne { object: String, id: Id, input: Map<String, Value> },
    PersistField { object: String, record_id: Id, field: String, value: Value },
    Search { object: String, request: SearchRequest },
}

/// In-memory store that records every call and can be told to fail fetches
/// or to hold mutations and searches until released.
pub struct RecordingStore {
    pub inner: InMemoryStore,
    calls: Mutex<Vec<Call>>,
    fail_fetches: AtomicBool,
    mutation_gate: Mutex<Option<Arc<Notify>>>,
    search_gate: Mutex<Option<Arc<Notify>>>,
}

impl RecordingStore {
    pub fn seeded() -> Self {
        let inner = InMemoryStore::new();
        load_seed_data(&inner).unwrap();
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_fetches: AtomicBool::new(false),
            mutation_gate: Mutex::new(None),
            search_gate: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn find_one_calls(&self, object: &str) -> Vec<Id> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::FindOne { object: o, id } if o == object => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn find_many_calls(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::FindMany { object, filter } => Some((object, filter)),
                _ => None,
            })
            .collect()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::UpdateOne { .. } | Call::PersistField { .. }))
            .collect()
    }

    pub fn fail_fetches(&self) {
        self.fail_fetches.store(true, Ordering::SeqCst);
    }

    /// Make mutations wait until the returned notify is signalled
    pub fn hold_mutations(&self) -> Arc<Notify> {
        install_gate(&self.mutation_gate)
    }

    /// Make candidate searches wait until the returned notify is signalled
    pub fn hold_searches(&self) -> Arc<Notify> {
        install_gate(&self.search_gate)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check_fetch(&self) -> Result<()> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            Err(anyhow!("simulated network failure"))
        } else {
            Ok(())
        }
    }
}

fn install_gate(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *slot.lock() = Some(Arc::clone(&gate));
    gate
}

async fn wait_for_gate(slot: &Mutex<Option<Arc<Notify>>>) {
    let gate = slot.lock().clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

#[async_trait::async_trait]
impl MetadataStore for RecordingStore {
    async fn get_object_metadata(&self, name_singular: &str) -> Result<Option<ObjectMetadata>> {
        self.inner.get_object_metadata(name_singular).await
    }
}

#[async_trait::async_trait]
impl RecordStore for RecordingStore {
    async fn find_one_record(&self, object_name: &str, id: &Id) -> Result<Option<Record>> {
        self.record(Call::FindOne {
            object: object_name.to_string(),
            id: id.clone(),
        });
        self.check_fetch()?;
        self.inner.find_one_record(object_name, id).await
    }

    async fn find_many_records(
        &self,
        object_name: &str,
        filter: &RecordFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        self.record(Call::FindMany {
            object: object_name.to_string(),
            filter: serde_json::to_value(filter)?,
        });
        self.check_fetch()?;
        self.inner.find_many_records(object_name, filter, limit).await
    }

    async fn update_one_record(
        &self,
        object_name: &str,
        id_to_update: &Id,
        update_input: Map<String, Value>,
    ) -> Result<Record> {
        wait_for_gate(&self.mutation_gate).await;
        self.record(Call::UpdateOne {
            object: object_name.to_string(),
            id: id_to_update.clone(),
            input: update_input.clone(),
        });
        self.inner.update_one_record(object_name, id_to_update, update_input).await
    }

    async fn persist_field(
        &self,
        object_name: &str,
        record_id: &Id,
        field_name: &str,
        value: Value,
    ) -> Result<Record> {
        wait_for_gate(&self.mutation_gate).await;
        self.record(Call::PersistField {
            object: object_name.to_string(),
            record_id: record_id.clone(),
            field: field_name.to_string(),
            value: value.clone(),
        });
        self.inner.persist_field(object_name, record_id, field_name, value).await
    }
}

#[async_trait::async_trait]
impl SearchStore for RecordingStore {
    async fn search_records(
        &self,
        object_name: &str,
        request: &SearchRequest,
        mapper: CandidateMapper<'_>,
    ) -> Result<SearchResult> {
        wait_for_gate(&self.search_gate).await;
        self.record(Call::Search {
            object: object_name.to_string(),
            request: request.clone(),
        });
        self.inner.search_records(object_name, request, mapper).await
    }
}

impl SearchFieldMapper for RecordingStore {
    fn search_field_names(&self, object_name: &str) -> Option<Vec<String>> {
        self.inner.search_field_names(object_name)
    }
}

pub struct Fixture {
    pub store: Arc<RecordingStore>,
    pub cache: Arc<RecordCache>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(RecordingStore::seeded())
    }

    pub fn with_store(store: RecordingStore) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(RecordCache::new()),
        }
    }

    pub async fn card(
        &self,
        object: &str,
        record_id: &str,
        field: &str,
    ) -> RelationFieldCard<RecordingStore> {
        self.card_with_config(object, record_id, field, RelationCardConfig::default())
            .await
    }

    pub async fn card_with_config(
        &self,
        object: &str,
        record_id: &str,
        field: &str,
        config: RelationCardConfig,
    ) -> RelationFieldCard<RecordingStore> {
        RelationFieldCard::resolve(
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            config,
            object,
            &record_id.to_string(),
            field,
        )
        .await
        .unwrap()
    }
}
