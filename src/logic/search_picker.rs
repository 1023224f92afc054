use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::logic::ResolvedRelation;
use crate::model::{CandidateEntity, Id, Record, SearchFilterGroup, SearchRequest};
use crate::store::traits::Store;

/// Build the scope id of one picker instance: one per (record, field)
pub fn picker_scope_id(record_id: &Id, field_label: &str) -> String {
    format!("relation-picker-{}-{}", record_id, field_label)
}

/// Free-text search input of one picker instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFilterState {
    pub scope_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PickerCandidates {
    pub candidates: Vec<CandidateEntity>,
    pub loading: bool,
}

/// Searchable picker offering target records that are not yet linked
#[derive(Debug)]
pub struct RelationSearchPicker {
    scope_id: String,
    filter_text: RwLock<String>,
    open: AtomicBool,
    in_flight: AtomicUsize,
    search_limit: usize,
    order_by: String,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RelationSearchPicker {
    pub fn new(scope_id: String, search_limit: usize, order_by: impl Into<String>) -> Self {
        Self {
            scope_id,
            filter_text: RwLock::new(String::new()),
            open: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            search_limit,
            order_by: order_by.into(),
        }
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Close the dropdown. The search text is cleared so the next open
    /// starts from the unfiltered candidate list.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.filter_text.write().clear();
        log::debug!("picker {} closed", self.scope_id);
    }

    pub fn set_search_filter(&self, text: impl Into<String>) {
        *self.filter_text.write() = text.into();
    }

    pub fn search_filter(&self) -> SearchFilterState {
        SearchFilterState {
            scope_id: self.scope_id.clone(),
            text: self.filter_text.read().clone(),
        }
    }

    /// True while a candidate query is running
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Query candidates for the current search text. Records already linked
    /// through the relation are never offered.
    pub async fn candidates<S>(
        &self,
        store: &S,
        relation: &ResolvedRelation,
        linked: &[Record],
    ) -> PickerCandidates
    where
        S: Store + ?Sized,
    {
        let target = &relation.target;
        let field_names = store
            .search_field_names(&target.name_singular)
            .unwrap_or_else(|| {
                log::debug!("no search fields for {}", target.name_singular);
                Vec::new()
            });
        let linked_ids: Vec<Id> = linked.iter().map(|record| record.id.clone()).collect();

        let request = SearchRequest {
            filter_groups: vec![SearchFilterGroup {
                field_names,
                filter_text: self.filter_text.read().clone(),
            }],
            order_by: self.order_by.clone(),
            selected_ids: linked_ids.clone(),
            excluded_ids: linked_ids.clone(),
            limit: self.search_limit,
        };
        let mapper = |record: &Record| CandidateEntity::from_record(record, target);

        let result = {
            let _guard = InFlightGuard::enter(&self.in_flight);
            store.search_records(&target.name_singular, &request, &mapper).await
        };

        match result {
            Ok(result) => {
                let excluded: HashSet<&Id> = linked_ids.iter().collect();
                let candidates = result
                    .entities_to_select
                    .into_iter()
                    .filter(|candidate| {
                        candidate.id.as_ref().map_or(true, |id| !excluded.contains(id))
                    })
                    .collect();
                PickerCandidates {
                    candidates,
                    loading: result.loading,
                }
            }
            Err(e) => {
                log::warn!("candidate search on {} failed: {}", target.name_singular, e);
                PickerCandidates::default()
            }
        }
    }
}
