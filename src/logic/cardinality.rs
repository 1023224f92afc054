use serde::{Deserialize, Serialize};

use crate::model::{ObjectMetadata, RelationFieldMetadata, RelationType};

/// Which side of the relation a field sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationCardinality {
    /// The owning record stores the target reference itself
    ToOne,
    /// Targets point back at the owning record through their reverse field
    ToMany,
}

pub struct RelationCardinalityResolver;

impl RelationCardinalityResolver {
    pub fn resolve(field: &RelationFieldMetadata) -> RelationCardinality {
        match field.relation_type {
            RelationType::ToOneObject => RelationCardinality::ToOne,
            RelationType::ToManyObjects => RelationCardinality::ToMany,
        }
    }
}

/// A relation field with its target collection's metadata attached
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRelation {
    pub field: RelationFieldMetadata,
    pub cardinality: RelationCardinality,
    pub target: ObjectMetadata,
    /// Name of the reverse field on the target; `None` when the target schema
    /// does not declare the field the relation points at.
    pub reverse_field_name: Option<String>,
}

impl ResolvedRelation {
    pub fn new(field: RelationFieldMetadata, target: ObjectMetadata) -> Self {
        let reverse_field_name = target
            .get_field_by_id(&field.relation_field_metadata_id)
            .map(|reverse| reverse.name.clone());
        if reverse_field_name.is_none() {
            log::debug!(
                "relation {} has no reverse field {} on {}",
                field.field_name,
                field.relation_field_metadata_id,
                target.name_singular
            );
        }

        Self {
            cardinality: RelationCardinalityResolver::resolve(&field),
            field,
            target,
            reverse_field_name,
        }
    }

    pub fn is_to_one(&self) -> bool {
        self.cardinality == RelationCardinality::ToOne
    }

    /// Foreign-key field on the target that stores the owning record's id
    pub fn reverse_foreign_key(&self) -> Option<String> {
        self.reverse_field_name.as_ref().map(|name| format!("{}Id", name))
    }

    /// Label identifier of the target, only when declared in its schema
    pub fn label_identifier_field_name(&self) -> Option<&str> {
        self.target.label_identifier_field().map(|field| field.name.as_str())
    }

    /// Relations to targets without a label identifier are not displayed
    pub fn is_displayable(&self) -> bool {
        self.label_identifier_field_name().is_some()
    }
}
