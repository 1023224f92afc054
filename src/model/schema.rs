use crate::model::{Id, RelationType};
use serde::{Deserialize, Serialize};

/// Metadata describing one collection (object) of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub id: Id,
    /// Singular name used to address the collection (e.g., "company")
    pub name_singular: String,
    /// Plural name used in navigation URIs (e.g., "companies")
    pub name_plural: String,
    /// Field rendered as a record's human-readable label. When absent,
    /// relations pointing at this object are not displayed at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_identifier_field_name: Option<String>,
    /// Field holding an avatar/image url for pickers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_identifier_field_name: Option<String>,
    pub fields: Vec<FieldMetadata>,
}

impl ObjectMetadata {
    /// Find a field definition by name
    pub fn get_field(&self, field_name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| field.name == field_name)
    }

    /// Find a field definition by ID
    pub fn get_field_by_id(&self, field_id: &Id) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| &field.id == field_id)
    }

    /// The label identifier field, only if it is actually declared
    pub fn label_identifier_field(&self) -> Option<&FieldMetadata> {
        self.label_identifier_field_name
            .as_deref()
            .and_then(|name| self.get_field(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub id: Id,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Present only for relation fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationDefinition>,
}

impl FieldMetadata {
    /// Build the relation descriptor consumed by the relation card, if this
    /// is a relation field.
    pub fn relation_metadata(&self) -> Option<RelationFieldMetadata> {
        let relation = self.relation.as_ref()?;
        Some(RelationFieldMetadata {
            field_name: self.name.clone(),
            label: self.label.clone(),
            relation_type: relation.relation_type,
            relation_object_name: relation.target_object_name.clone(),
            relation_field_metadata_id: relation.target_field_metadata_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    DateTime,
    Uuid,
    Relation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDefinition {
    pub relation_type: RelationType,
    pub target_object_name: String,
    /// Id of the reverse field declared on the target object
    pub target_field_metadata_id: Id,
}

/// Static descriptor of a relation field on the owning object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationFieldMetadata {
    pub field_name: String,
    pub label: String,
    pub relation_type: RelationType,
    /// Singular name of the target collection
    pub relation_object_name: String,
    /// Id of the matching reverse field on the target collection
    pub relation_field_metadata_id: Id,
}
