//! Catalog records and the reference entities attached to them.
//!
//! Records are kept as ordered JSON maps: the catalog owns the schema and a
//! pass only ever touches the fields the operator selected, so everything
//! else has to survive the round trip untouched.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::sync::{SyncError, SyncResult};

/// One product-like record fetched from the catalog service.
///
/// The `id` is cached at construction and never changes; it is also present
/// in `fields` so the record can be sent back verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    id: i64,
    fields: Map<String, Value>,
}

impl CatalogRecord {
    /// Build a record from the raw JSON object returned by the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedRecord`] if there is no integer `id`.
    pub fn from_fields(fields: Map<String, Value>) -> SyncResult<Self> {
        let id = fields
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                SyncError::MalformedRecord(match fields.get("id") {
                    Some(other) => format!("id must be an integer, got {}", value_kind(other)),
                    None => "record has no id".to_string(),
                })
            })?;
        Ok(Self { id, fields })
    }

    /// Build a record from a JSON value (must be an object).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedRecord`] for non-objects or a missing id.
    pub fn from_value(value: Value) -> SyncResult<Self> {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            other => Err(SyncError::MalformedRecord(format!(
                "expected an object, got {}",
                value_kind(&other)
            ))),
        }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Overwrite a field in the in-memory copy.
    ///
    /// `id` is the join key and is never reassigned.
    pub fn set(&mut self, field: &str, value: Value) {
        if field == "id" {
            return;
        }
        self.fields.insert(field.to_string(), value);
    }

    /// Field names in the order the catalog returned them.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl Serialize for CatalogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Taxonomy kinds that records reference by `{id, name}` objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Category,
    Tag,
}

impl ReferenceKind {
    /// The record field that holds the list of entities of this kind.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Tag => "tags",
        }
    }

    /// Reference kind stored under a record field, if any.
    #[must_use]
    pub fn for_field(field: &str) -> Option<Self> {
        match field {
            "categories" => Some(Self::Category),
            "tags" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// A named taxonomy item (category or tag).
///
/// Attributes other than `id` and `name` (e.g. `slug`) are carried in
/// `extra` so a resolved entity serializes back in the catalog's own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceEntity {
    /// JSON form written into a record's list field.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::from(self.id));
        object.insert("name".to_string(), Value::String(self.name.clone()));
        for (key, value) in &self.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// One divergent field detected during an import pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    pub record_id: i64,
    pub field: String,
    /// Live value, in display form.
    pub old_value: String,
    /// Value read from the sheet, as the operator typed it.
    pub new_value: String,
}

/// Short JSON type name for error messages.
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_requires_integer_id() {
        let record = CatalogRecord::from_value(json!({"id": 7, "name": "Deck"})).unwrap();
        assert_eq!(record.id(), 7);

        let err = CatalogRecord::from_value(json!({"name": "Deck"})).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord(_)));

        let err = CatalogRecord::from_value(json!({"id": "7"})).unwrap_err();
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_record_keeps_field_order_and_ignores_id_writes() {
        let mut record =
            CatalogRecord::from_value(json!({"id": 1, "sku": "A", "price": "10"})).unwrap();
        record.set("price", json!("12"));
        record.set("id", json!(99));

        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["id", "sku", "price"]);
        assert_eq!(record.id(), 1);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": 1, "sku": "A", "price": "12"})
        );
    }

    #[test]
    fn test_reference_entity_round_trips_extra_attributes() {
        let raw = json!({"id": 3, "name": "Decks", "slug": "decks"});
        let entity: ReferenceEntity = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entity.name, "Decks");
        assert_eq!(entity.to_value(), raw);
    }

    #[test]
    fn test_reference_kind_fields() {
        assert_eq!(ReferenceKind::for_field("categories"), Some(ReferenceKind::Category));
        assert_eq!(ReferenceKind::for_field("tags"), Some(ReferenceKind::Tag));
        assert_eq!(ReferenceKind::for_field("price"), None);
        assert_eq!(ReferenceKind::Tag.field_name(), "tags");
    }
}
