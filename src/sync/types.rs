//! Sync types shared by the export and import passes.
//!
//! Errors, field selection, and the statistics each pass reports.

use serde::Serialize;

use crate::model::{CatalogRecord, ReferenceKind};

/// Fields chosen on the command line: `*` or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every field of the first fetched record.
    All,
    /// Explicitly named fields, in the order given.
    Named(Vec<String>),
}

impl FieldSelection {
    /// Parse `--fields` arguments.
    ///
    /// Each argument may itself hold several names separated by commas
    /// and/or whitespace, so `-f "price, sku"`, `-f price,sku` and
    /// `-f price sku` are the same selection.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSelection`] if nothing is selected or `*`
    /// is mixed with named fields.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> SyncResult<Self> {
        let names: Vec<String> = args
            .iter()
            .flat_map(|arg| {
                arg.as_ref()
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        if names.is_empty() {
            return Err(SyncError::InvalidSelection("no fields given".to_string()));
        }
        if names.iter().any(|n| n == "*") {
            if names.len() == 1 {
                return Ok(Self::All);
            }
            return Err(SyncError::InvalidSelection(
                "`*` cannot be combined with named fields".to_string(),
            ));
        }

        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Ok(Self::Named(unique))
    }

    /// Columns for an export: `id` always first.
    #[must_use]
    pub fn export_fields(&self, first: &CatalogRecord) -> Vec<String> {
        let rest = self.fields_without_id(first);
        std::iter::once("id".to_string()).chain(rest).collect()
    }

    /// Fields compared during an import: `id` is the join key, never a target.
    #[must_use]
    pub fn import_fields(&self, first: &CatalogRecord) -> Vec<String> {
        self.fields_without_id(first)
    }

    fn fields_without_id(&self, first: &CatalogRecord) -> Vec<String> {
        match self {
            Self::All => first
                .field_names()
                .filter(|name| *name != "id")
                .map(str::to_string)
                .collect(),
            Self::Named(names) => names.iter().filter(|n| *n != "id").cloned().collect(),
        }
    }
}

/// Broad error classes. Every one of them aborts the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    NotFound,
    DataIntegrity,
    Transport,
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A reference entity has an id but no usable name.
    #[error("{kind} name is empty for {kind} id {id}")]
    UnnamedReference { kind: ReferenceKind, id: i64 },

    /// Two different entities share one name in the fetched snapshot.
    #[error("{kind} name \"{name}\" is used by both id {first_id} and id {second_id}")]
    DuplicateReferenceName {
        kind: ReferenceKind,
        name: String,
        first_id: i64,
        second_id: i64,
    },

    /// Field name is not a known catalog field.
    #[error("Unrecognized field: {field}")]
    UnrecognizedField {
        field: String,
        suggestion: Option<String>,
    },

    /// A selected field is absent from a fetched record.
    #[error("Unrecognized field: {field} (missing from record {record_id})")]
    FieldMissingFromRecord { field: String, record_id: i64 },

    /// A selected field has no column in the sheet header.
    #[error("Field \"{field}\" is not a column of the sheet")]
    FieldMissingFromSheet { field: String },

    /// `--fields` could not be interpreted.
    #[error("Invalid field selection: {0}")]
    InvalidSelection(String),

    /// A name typed in the sheet matches no entity of its kind.
    #[error("{kind} \"{name}\" not found")]
    ReferenceNotFound {
        kind: ReferenceKind,
        name: String,
        /// Names that would have resolved, sorted.
        known: Vec<String>,
    },

    /// No spreadsheet with the configured name exists.
    #[error("No spreadsheet named \"{name}\" found")]
    DocumentNotFound { name: String },

    /// A tracked cell is blank.
    #[error("Couldn't parse {field} from sheet row {row}")]
    UnparseableCell { row: usize, field: String },

    /// An integer-typed cell holds something else.
    #[error("Sheet row {row}: {field} must be an integer, got \"{value}\"")]
    InvalidInteger {
        row: usize,
        field: String,
        value: String,
    },

    /// The parse path was handed a value that is not a string.
    #[error("Display value for field \"{field}\" must be a string, got {found}")]
    ParseInputNotString { field: String, found: &'static str },

    /// A live field value does not have the shape its strategy expects.
    #[error("Malformed value for field \"{field}\": {message}")]
    MalformedValue { field: String, message: String },

    /// A fetched record is unusable.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status.
    #[error("{service} request failed ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Remote API answered 2xx with a body missing what was asked for.
    #[error("Unexpected {service} response: {message}")]
    UnexpectedResponse {
        service: &'static str,
        message: String,
    },

    /// Update call for one record failed; earlier updates are not rolled back.
    #[error("Failed to update record {id}: {source}")]
    UpdateFailed {
        id: i64,
        #[source]
        source: Box<SyncError>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnnamedReference { .. }
            | Self::DuplicateReferenceName { .. }
            | Self::UnrecognizedField { .. }
            | Self::FieldMissingFromRecord { .. }
            | Self::FieldMissingFromSheet { .. }
            | Self::InvalidSelection(_) => ErrorCategory::Configuration,
            Self::ReferenceNotFound { .. } | Self::DocumentNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::UnparseableCell { .. }
            | Self::InvalidInteger { .. }
            | Self::ParseInputNotString { .. }
            | Self::MalformedValue { .. }
            | Self::MalformedRecord(_)
            | Self::Json(_) => ErrorCategory::DataIntegrity,
            Self::Http(_)
            | Self::Api { .. }
            | Self::UnexpectedResponse { .. }
            | Self::UpdateFailed { .. } => ErrorCategory::Transport,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Statistics for an export pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    /// Number of records written as data rows.
    pub records: usize,
    /// Columns written, in order.
    pub fields: Vec<String>,
    /// Destination spreadsheet id.
    pub document_id: String,
    /// Whether the spreadsheet was created (vs. overwritten).
    pub created: bool,
    /// Browser URL of the spreadsheet.
    pub url: String,
}

/// Statistics for an import pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Data rows read from the sheet.
    pub rows: usize,
    /// Rows whose id matched at least one record.
    pub matched_rows: usize,
    /// Rows whose id matched nothing (stale or deleted products).
    pub unmatched_rows: usize,
    /// Records with at least one divergent field.
    pub records_changed: usize,
    /// Divergent fields across all records.
    pub fields_changed: usize,
    /// Update calls sent to the catalog.
    pub updates_sent: usize,
    /// Whether write-backs were suppressed.
    pub dry_run: bool,
}

impl ImportStats {
    /// Returns true if the sheet already matched the catalog.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fields_changed == 0
    }
}

/// Outcome of a pass: the catalog may legitimately be empty.
#[derive(Debug, Clone)]
pub enum PassOutcome<T> {
    /// The catalog returned no records; nothing was done.
    EmptyCatalog,
    /// The pass ran to completion.
    Completed(T),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> CatalogRecord {
        CatalogRecord::from_value(json!({"name": "Deck", "id": 1, "price": "10"})).unwrap()
    }

    #[test]
    fn test_parse_star() {
        assert_eq!(FieldSelection::parse(&["*"]).unwrap(), FieldSelection::All);
        assert!(FieldSelection::parse(&["*", "price"]).is_err());
    }

    #[test]
    fn test_parse_mixed_separators() {
        let selection = FieldSelection::parse(&["price, sku", "name", "price"]).unwrap();
        assert_eq!(
            selection,
            FieldSelection::Named(vec!["price".into(), "sku".into(), "name".into()])
        );
        assert!(FieldSelection::parse(&[" , "]).is_err());
    }

    #[test]
    fn test_export_fields_put_id_first() {
        assert_eq!(FieldSelection::All.export_fields(&record()), vec!["id", "name", "price"]);

        let named = FieldSelection::Named(vec!["price".into(), "id".into()]);
        assert_eq!(named.export_fields(&record()), vec!["id", "price"]);
    }

    #[test]
    fn test_import_fields_exclude_id() {
        assert_eq!(FieldSelection::All.import_fields(&record()), vec!["name", "price"]);
        let named = FieldSelection::Named(vec!["id".into(), "price".into()]);
        assert_eq!(named.import_fields(&record()), vec!["price"]);
    }

    #[test]
    fn test_error_categories() {
        let err = SyncError::DocumentNotFound { name: "x".into() };
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = SyncError::UpdateFailed {
            id: 1,
            source: Box::new(SyncError::Api {
                service: "catalog",
                status: 500,
                body: String::new(),
            }),
        };
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.to_string().contains("record 1"));
    }
}
