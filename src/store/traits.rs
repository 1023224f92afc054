use crate::model::{
    CandidateEntity, Id, ObjectMetadata, Record, RecordFilter, SearchRequest, SearchResult,
};
use anyhow::Result;
use serde_json::{Map, Value};

/// Maps a target record to a picker candidate
pub type CandidateMapper<'a> = &'a (dyn Fn(&Record) -> CandidateEntity + Send + Sync);

/// Schema/metadata provider
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Get metadata for a collection by its singular name
    async fn get_object_metadata(&self, name_singular: &str) -> Result<Option<ObjectMetadata>>;
}

/// Record fetch and mutation services
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a single record by id
    async fn find_one_record(&self, object_name: &str, id: &Id) -> Result<Option<Record>>;
    /// Fetch records matching a filter
    async fn find_many_records(
        &self,
        object_name: &str,
        filter: &RecordFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Record>>;
    /// Apply a partial update to one record and return the updated record
    async fn update_one_record(
        &self,
        object_name: &str,
        id_to_update: &Id,
        update_input: Map<String, Value>,
    ) -> Result<Record>;
    /// Persist a single field's new value on a record and return the updated record
    async fn persist_field(
        &self,
        object_name: &str,
        record_id: &Id,
        field_name: &str,
        value: Value,
    ) -> Result<Record>;
}

/// Candidate search used by relation pickers
#[async_trait::async_trait]
pub trait SearchStore: Send + Sync {
    async fn search_records(
        &self,
        object_name: &str,
        request: &SearchRequest,
        mapper: CandidateMapper<'_>,
    ) -> Result<SearchResult>;
}

/// Resolves which fields free-text search runs over for a collection
pub trait SearchFieldMapper: Send + Sync {
    fn search_field_names(&self, object_name: &str) -> Option<Vec<String>>;
}

pub trait Store: MetadataStore + RecordStore + SearchStore + SearchFieldMapper + Send + Sync {}
impl<T: MetadataStore + RecordStore + SearchStore + SearchFieldMapper + Send + Sync> Store for T {}
