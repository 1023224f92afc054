use serde::{Deserialize, Serialize};

use crate::logic::ResolvedRelation;
use crate::model::Id;

/// Filter operand used in list-view filter queries
pub const FILTER_OPERAND_IS: &str = "is";

/// When the "view all" link is shown next to a relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewAllLinkPolicy {
    /// Only for to-one relation fields
    #[default]
    ToOneOnly,
    /// For every relation field
    Always,
}

impl ViewAllLinkPolicy {
    pub fn shows_link(&self, relation: &ResolvedRelation) -> bool {
        match self {
            ViewAllLinkPolicy::ToOneOnly => relation.is_to_one(),
            ViewAllLinkPolicy::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewAllLink {
    pub href: String,
    pub count: usize,
}

pub struct RelationLinkBuilder;

impl RelationLinkBuilder {
    /// `/objects/<plural>?filter[<reverse>][is][0]=<owning id>`, url-encoded.
    /// `None` when the reverse field is unknown.
    pub fn build(relation: &ResolvedRelation, owning_record_id: &Id) -> Option<String> {
        let reverse_field_name = relation.reverse_field_name.as_ref()?;
        let key = format!("filter[{}][{}][0]", reverse_field_name, FILTER_OPERAND_IS);
        Some(format!(
            "/objects/{}?{}={}",
            relation.target.name_plural,
            urlencoding::encode(&key),
            urlencoding::encode(owning_record_id)
        ))
    }

    /// The link and count displayed next to a relation, subject to `policy`
    pub fn view_all(
        relation: &ResolvedRelation,
        owning_record_id: &Id,
        count: usize,
        policy: ViewAllLinkPolicy,
    ) -> Option<ViewAllLink> {
        if !policy.shows_link(relation) {
            return None;
        }
        let href = Self::build(relation, owning_record_id)?;
        Some(ViewAllLink { href, count })
    }
}
