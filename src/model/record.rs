use crate::model::Id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record from any collection: an id plus an open set of fields.
///
/// Serialised flat, so `{"id": "p1", "name": "Ada"}` round-trips with the
/// id lifted out of the field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Id,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mostly used by seed data and tests
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        if field_name == "id" {
            return None;
        }
        self.fields.get(field_name)
    }

    /// Field lookup that also resolves `id`, used by filters and ordering
    pub fn value_of(&self, field_name: &str) -> Option<Value> {
        if field_name == "id" {
            Some(Value::String(self.id.clone()))
        } else {
            self.fields.get(field_name).cloned()
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        // The id is immutable once the record exists
        if name == "id" {
            return;
        }
        self.fields.insert(name, value);
    }

    /// Shallow-merge an update input into this record
    pub fn apply_update(&mut self, update_input: &Map<String, Value>) {
        for (name, value) in update_input {
            self.set(name.clone(), value.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(object)
    }

    /// Read a field's string value, used for labels and search matching
    pub fn string_field(&self, field_name: &str) -> Option<&str> {
        self.get(field_name).and_then(Value::as_str)
    }
}

/// Value of a to-one relation field as stored on the owning record:
/// either null/absent or an object carrying at least the target's id.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationFieldValue {
    pub id: Id,
}

impl RelationFieldValue {
    pub fn read(record: &Record, field_name: &str) -> Option<Self> {
        let id = record.get(field_name)?.as_object()?.get("id")?.as_str()?;
        if id.is_empty() {
            return None;
        }
        Some(Self { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serialises_flat() {
        let record = Record::new("p1").with_field("name", json!("Ada"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": "p1", "name": "Ada"}));

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn id_cannot_be_overwritten() {
        let mut record = Record::new("p1");
        record.set("id", json!("other"));
        assert_eq!(record.id, "p1");
        assert!(record.fields.get("id").is_none());
    }

    #[test]
    fn apply_update_merges_fields() {
        let mut record = Record::new("p1")
            .with_field("name", json!("Ada"))
            .with_field("companyId", Value::Null);

        let mut update = Map::new();
        update.insert("companyId".to_string(), json!("c1"));
        update.insert("company".to_string(), json!({"id": "c1", "name": "Acme"}));
        record.apply_update(&update);

        assert_eq!(record.get("name"), Some(&json!("Ada")));
        assert_eq!(record.get("companyId"), Some(&json!("c1")));
        assert_eq!(record.get("company").and_then(|c| c.get("name")), Some(&json!("Acme")));
    }

    #[test]
    fn relation_field_value_reads_object_with_id() {
        let owning = Record::new("p1")
            .with_field("company", json!({"id": "c1", "name": "Acme"}))
            .with_field("manager", Value::Null)
            .with_field("team", json!({"name": "missing id"}));

        let value = RelationFieldValue::read(&owning, "company").unwrap();
        assert_eq!(value.id, "c1");

        assert!(RelationFieldValue::read(&owning, "manager").is_none());
        assert!(RelationFieldValue::read(&owning, "team").is_none());
        assert!(RelationFieldValue::read(&owning, "absent").is_none());
    }
}
