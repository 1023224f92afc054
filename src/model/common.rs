use serde::{Deserialize, Serialize};

pub type Id = String;

/// Cardinality of a relation field as declared in object metadata.
///
/// Only to-one and to-many relations are modelled; many-to-many relation
/// fields are rejected when metadata is deserialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    ToOneObject,
    ToManyObjects,
}

impl RelationType {
    pub fn is_to_one(&self) -> bool {
        matches!(self, RelationType::ToOneObject)
    }
}
