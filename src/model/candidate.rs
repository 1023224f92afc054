use crate::model::{Id, ObjectMetadata, Record};
use serde::{Deserialize, Serialize};

/// A target record offered by the relation picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// Missing when the backing record could not be identified; selecting
    /// such a candidate does nothing.
    pub id: Option<Id>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub record: Record,
}

impl CandidateEntity {
    /// Map a target record to a candidate using the target object's label
    /// and image identifier fields.
    pub fn from_record(record: &Record, metadata: &ObjectMetadata) -> Self {
        let name = metadata
            .label_identifier_field_name
            .as_deref()
            .and_then(|field| record.string_field(field))
            .unwrap_or_default()
            .to_string();
        let avatar_url = metadata
            .image_identifier_field_name
            .as_deref()
            .and_then(|field| record.string_field(field))
            .map(str::to_string);

        Self {
            id: Some(record.id.clone()).filter(|id| !id.is_empty()),
            name,
            avatar_url,
            record: record.clone(),
        }
    }
}

/// Result of a picker search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entities_to_select: Vec<CandidateEntity>,
    pub selected_entities: Vec<CandidateEntity>,
    pub loading: bool,
}
