//! Name → entity indexes for reference fields.
//!
//! Sheets show categories and tags by name; the catalog wants the entity
//! objects back. Each pass builds fresh indexes from the records it just
//! fetched, so an index never outlives the snapshot it was built from.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::model::{value_kind, CatalogRecord, ReferenceEntity, ReferenceKind};
use crate::sync::types::{SyncError, SyncResult};

/// Exact-name index of one reference kind.
#[derive(Debug, Clone)]
pub struct LookupIndex {
    kind: ReferenceKind,
    by_name: HashMap<String, ReferenceEntity>,
}

impl LookupIndex {
    #[must_use]
    pub fn empty(kind: ReferenceKind) -> Self {
        Self {
            kind,
            by_name: HashMap::new(),
        }
    }

    /// Index every entity of `kind` attached to `records`.
    ///
    /// The first occurrence of a name registers it. Entities without an id
    /// are skipped (they are not real taxonomy items yet).
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnnamedReference`] for an entity with an id and no name
    /// - [`SyncError::DuplicateReferenceName`] when one name maps to two ids
    /// - [`SyncError::MalformedValue`] when the record field is not a list
    pub fn build(kind: ReferenceKind, records: &[CatalogRecord]) -> SyncResult<Self> {
        let field = kind.field_name();
        let mut index = Self::empty(kind);

        for record in records {
            let entries = match record.get(field) {
                None | Some(Value::Null) => continue,
                Some(Value::Array(entries)) => entries,
                Some(other) => {
                    return Err(SyncError::MalformedValue {
                        field: field.to_string(),
                        message: format!(
                            "expected a list on record {}, got {}",
                            record.id(),
                            value_kind(other)
                        ),
                    });
                }
            };

            for entry in entries {
                index.register(entry, record.id())?;
            }
        }

        debug!(%kind, count = index.len(), "Built lookup index");
        Ok(index)
    }

    fn register(&mut self, entry: &Value, record_id: i64) -> SyncResult<()> {
        let id = match entry.get("id") {
            None | Some(Value::Null) => return Ok(()),
            Some(id) => id.as_i64().ok_or_else(|| SyncError::MalformedValue {
                field: self.kind.field_name().to_string(),
                message: format!(
                    "{} id on record {record_id} must be an integer, got {}",
                    self.kind,
                    value_kind(id)
                ),
            })?,
        };

        let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.is_empty() {
            return Err(SyncError::UnnamedReference {
                kind: self.kind,
                id,
            });
        }

        if let Some(existing) = self.by_name.get(name) {
            if existing.id != id {
                return Err(SyncError::DuplicateReferenceName {
                    kind: self.kind,
                    name: name.to_string(),
                    first_id: existing.id,
                    second_id: id,
                });
            }
            return Ok(());
        }

        let entity: ReferenceEntity = serde_json::from_value(entry.clone())?;
        self.by_name.insert(name.to_string(), entity);
        Ok(())
    }

    /// Resolve a name typed in the sheet (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ReferenceNotFound`] if no entity has that exact name.
    pub fn resolve(&self, name: &str) -> SyncResult<&ReferenceEntity> {
        let name = name.trim();
        self.by_name
            .get(name)
            .ok_or_else(|| SyncError::ReferenceNotFound {
                kind: self.kind,
                name: name.to_string(),
                known: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The indexes for every reference kind, built together at the start of a pass.
#[derive(Debug, Clone)]
pub struct LookupIndexes {
    pub categories: LookupIndex,
    pub tags: LookupIndex,
}

impl LookupIndexes {
    /// # Errors
    ///
    /// Propagates the first error from [`LookupIndex::build`].
    pub fn build(records: &[CatalogRecord]) -> SyncResult<Self> {
        Ok(Self {
            categories: LookupIndex::build(ReferenceKind::Category, records)?,
            tags: LookupIndex::build(ReferenceKind::Tag, records)?,
        })
    }

    #[must_use]
    pub const fn get(&self, kind: ReferenceKind) -> &LookupIndex {
        match kind {
            ReferenceKind::Category => &self.categories,
            ReferenceKind::Tag => &self.tags,
        }
    }
}

impl Default for LookupIndexes {
    fn default() -> Self {
        Self {
            categories: LookupIndex::empty(ReferenceKind::Category),
            tags: LookupIndex::empty(ReferenceKind::Tag),
        }
    }
}
