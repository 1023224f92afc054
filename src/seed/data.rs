use crate::model::{
    FieldMetadata, FieldType, ObjectMetadata, Record, RelationDefinition, RelationType,
};
use crate::store::InMemoryStore;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

pub const COMPANY: &str = "company";
pub const PERSON: &str = "person";

/// Helper function to create a plain (non-relation) field
fn create_field(id: &str, name: &str, label: &str, field_type: FieldType) -> FieldMetadata {
    FieldMetadata {
        id: id.to_string(),
        name: name.to_string(),
        label: label.to_string(),
        field_type,
        relation: None,
    }
}

/// Helper function to create a relation field pointing at `target`
fn create_relation_field(
    id: &str,
    name: &str,
    label: &str,
    relation_type: RelationType,
    target: &str,
    target_field_id: &str,
) -> FieldMetadata {
    FieldMetadata {
        id: id.to_string(),
        name: name.to_string(),
        label: label.to_string(),
        field_type: FieldType::Relation,
        relation: Some(RelationDefinition {
            relation_type,
            target_object_name: target.to_string(),
            target_field_metadata_id: target_field_id.to_string(),
        }),
    }
}

pub fn company_metadata() -> ObjectMetadata {
    ObjectMetadata {
        id: "object-company".to_string(),
        name_singular: COMPANY.to_string(),
        name_plural: "companies".to_string(),
        label_identifier_field_name: Some("name".to_string()),
        image_identifier_field_name: None,
        fields: vec![
            create_field("field-company-name", "name", "Name", FieldType::Text),
            create_field("field-company-domain", "domainName", "Domain", FieldType::Text),
            create_field(
                "field-company-created-at",
                "createdAt",
                "Creation date",
                FieldType::DateTime,
            ),
            create_relation_field(
                "field-company-people",
                "people",
                "People",
                RelationType::ToManyObjects,
                PERSON,
                "field-person-company",
            ),
        ],
    }
}

pub fn person_metadata() -> ObjectMetadata {
    ObjectMetadata {
        id: "object-person".to_string(),
        name_singular: PERSON.to_string(),
        name_plural: "people".to_string(),
        label_identifier_field_name: Some("name".to_string()),
        image_identifier_field_name: Some("avatarUrl".to_string()),
        fields: vec![
            create_field("field-person-name", "name", "Name", FieldType::Text),
            create_field("field-person-email", "email", "Email", FieldType::Text),
            create_field("field-person-avatar", "avatarUrl", "Avatar", FieldType::Text),
            create_field(
                "field-person-created-at",
                "createdAt",
                "Creation date",
                FieldType::DateTime,
            ),
            create_field("field-person-company-id", "companyId", "Company id", FieldType::Uuid),
            create_relation_field(
                "field-person-company",
                "company",
                "Company",
                RelationType::ToOneObject,
                COMPANY,
                "field-company-people",
            ),
        ],
    }
}

pub fn demo_object_metadata() -> Vec<ObjectMetadata> {
    vec![company_metadata(), person_metadata()]
}

fn seed_timestamp(offset_minutes: i64) -> String {
    // Fixed base so candidate ordering by createdAt is stable across runs
    let base = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_else(Utc::now);
    (base + Duration::minutes(offset_minutes)).to_rfc3339()
}

/// Companies as (id, name, domain)
const COMPANIES: &[(&str, &str, &str)] = &[
    ("company-acme", "Acme", "acme.com"),
    ("company-globex", "Globex", "globex.com"),
    ("company-initech", "Initech", "initech.com"),
];

/// People as (id, name, company id)
const PEOPLE: &[(&str, &str, Option<&str>)] = &[
    ("person-ada", "Ada Lovelace", Some("company-acme")),
    ("person-grace", "Grace Hopper", Some("company-acme")),
    ("person-katherine", "Katherine Johnson", Some("company-acme")),
    ("person-dorothy", "Dorothy Vaughan", Some("company-acme")),
    ("person-mary", "Mary Jackson", Some("company-acme")),
    ("person-hedy", "Hedy Lamarr", Some("company-acme")),
    ("person-alan", "Alan Turing", Some("company-globex")),
    ("person-linus", "Linus Torvalds", None),
    ("person-margaret", "Margaret Hamilton", None),
    ("person-barbara", "Barbara Liskov", None),
];

pub fn demo_companies() -> Vec<Record> {
    COMPANIES
        .iter()
        .enumerate()
        .map(|(index, (id, name, domain))| {
            Record::new(*id)
                .with_field("name", json!(name))
                .with_field("domainName", json!(domain))
                .with_field("createdAt", json!(seed_timestamp(index as i64)))
        })
        .collect()
}

pub fn demo_people() -> Result<Vec<Record>> {
    let companies = demo_companies();
    PEOPLE
        .iter()
        .enumerate()
        .map(|(index, (id, name, company_id))| {
            let company = match company_id {
                Some(company_id) => {
                    let company = companies
                        .iter()
                        .find(|company| company.id == *company_id)
                        .ok_or_else(|| anyhow!("Seed company {} not found", company_id))?;
                    json!({ "id": company.id, "name": company.get("name") })
                }
                None => Value::Null,
            };
            let first_name = name.split_whitespace().next().unwrap_or(*name).to_lowercase();

            Ok(Record::new(*id)
                .with_field("name", json!(name))
                .with_field("email", json!(format!("{}@example.com", first_name)))
                .with_field(
                    "avatarUrl",
                    json!(format!("https://avatars.example.com/{}.png", first_name)),
                )
                .with_field("createdAt", json!(seed_timestamp(index as i64)))
                .with_field("companyId", json!(company_id))
                .with_field("company", company))
        })
        .collect()
}

/// Load the demo workspace into an in-memory store
pub fn load_seed_data(store: &InMemoryStore) -> Result<()> {
    for metadata in demo_object_metadata() {
        store.register_object(metadata);
    }

    for company in demo_companies() {
        store.insert_record(COMPANY, company);
    }
    for person in demo_people()? {
        store.insert_record(PERSON, person);
    }

    store.set_search_fields(COMPANY, vec!["name".to_string(), "domainName".to_string()]);
    store.set_search_fields(PERSON, vec!["name".to_string(), "email".to_string()]);

    log::info!(
        "seeded {} companies and {} people",
        store.record_count(COMPANY),
        store.record_count(PERSON)
    );
    Ok(())
}
