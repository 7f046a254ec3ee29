//! Row-by-row reconciliation of sheet edits against live records.
//!
//! For each data row the reconciler reads the row id and the tracked
//! fields, finds the records with that id, and compares field by field with
//! [`FieldCodec::equivalent`]. Divergent values are written into the
//! in-memory record immediately so the caller can send the whole record
//! back in one update.
//!
//! # Strictness
//!
//! A blank cell in a tracked column is a data error, not "no change": the
//! pass stops at that row. Rows whose id matches no record are skipped
//! silently so a sheet may still list deleted products.

use serde_json::Value;
use tracing::{debug, info};

use crate::model::{CatalogRecord, FieldUpdate, HeaderMap, SheetRow};
use crate::sync::codec::{identity_display, identity_equivalent, FieldCodec, FieldSpec};
use crate::sync::types::{SyncError, SyncResult};

/// Updates detected for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Position of the record in the snapshot slice.
    pub index: usize,
    pub record_id: i64,
    pub updates: Vec<FieldUpdate>,
}

/// What one sheet row did.
#[derive(Debug, Clone, Default)]
pub struct RowOutcome {
    pub row_id: i64,
    /// Records sharing the row id.
    pub matched: usize,
    /// Only records with at least one divergent field.
    pub changes: Vec<RecordChange>,
}

/// A tracked field bound to its sheet column.
#[derive(Debug, Clone)]
struct TrackedField {
    spec: FieldSpec,
    column: usize,
}

/// Sheet value of one tracked field, before and after parsing.
struct SheetValue<'s> {
    field: &'s TrackedField,
    raw: String,
    typed: Value,
}

/// Compares sheet rows with catalog records.
pub struct Reconciler<'a> {
    codec: &'a FieldCodec,
    id_column: usize,
    fields: Vec<TrackedField>,
}

impl<'a> Reconciler<'a> {
    /// Bind `fields` to the sheet's columns.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::FieldMissingFromSheet`] if `id` or any target
    /// field has no header column.
    pub fn new(codec: &'a FieldCodec, fields: &[FieldSpec], header: &HeaderMap) -> SyncResult<Self> {
        let column_of = |name: &str| {
            header
                .column(name)
                .ok_or_else(|| SyncError::FieldMissingFromSheet {
                    field: name.to_string(),
                })
        };

        let id_column = column_of("id")?;
        let fields = fields
            .iter()
            .filter(|spec| spec.name != "id")
            .map(|spec| {
                Ok(TrackedField {
                    spec: spec.clone(),
                    column: column_of(&spec.name)?,
                })
            })
            .collect::<SyncResult<Vec<_>>>()?;

        Ok(Self {
            codec,
            id_column,
            fields,
        })
    }

    /// Field names being compared, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.spec.name.as_str())
    }

    /// Reconcile one sheet row against every record sharing its id.
    ///
    /// Matched records are mutated in place with the sheet values that
    /// diverged.
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnparseableCell`] for a blank `id` or tracked cell
    /// - [`SyncError::InvalidInteger`] for a non-integer in an integer field
    /// - [`SyncError::ReferenceNotFound`] for an unknown category/tag name
    ///   (only checked when the row matches a record)
    pub fn reconcile_row(
        &self,
        row: &SheetRow<'_>,
        records: &mut [CatalogRecord],
    ) -> SyncResult<RowOutcome> {
        let raw_id = extract(row, self.id_column, "id")?;
        let row_id = parse_integer(row, "id", &raw_id)?;

        let raw_values = self
            .fields
            .iter()
            .map(|field| Ok((field, extract(row, field.column, &field.spec.name)?)))
            .collect::<SyncResult<Vec<_>>>()?;

        let matches: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.id() == row_id)
            .map(|(index, _)| index)
            .collect();

        let mut outcome = RowOutcome {
            row_id,
            matched: matches.len(),
            changes: Vec::new(),
        };
        if matches.is_empty() {
            debug!(row = row.number, id = row_id, "No catalog record for sheet row");
            return Ok(outcome);
        }

        let sheet_values = raw_values
            .into_iter()
            .map(|(field, raw)| {
                let typed = self.typed_value(row, field, &raw)?;
                Ok(SheetValue { field, raw, typed })
            })
            .collect::<SyncResult<Vec<_>>>()?;

        for index in matches {
            let record = &mut records[index];
            let updates = self.diff_record(record, &sheet_values)?;
            if !updates.is_empty() {
                outcome.changes.push(RecordChange {
                    index,
                    record_id: record.id(),
                    updates,
                });
            }
        }

        Ok(outcome)
    }

    /// Typed sheet value: integers are parsed directly, everything else
    /// goes through the codec's parse path.
    fn typed_value(&self, row: &SheetRow<'_>, field: &TrackedField, raw: &str) -> SyncResult<Value> {
        if field.spec.integer {
            return Ok(Value::from(parse_integer(row, &field.spec.name, raw)?));
        }
        self.codec
            .from_display(&field.spec, &Value::String(raw.to_string()))
    }

    fn diff_record(
        &self,
        record: &mut CatalogRecord,
        sheet_values: &[SheetValue<'_>],
    ) -> SyncResult<Vec<FieldUpdate>> {
        let mut updates = Vec::new();

        for value in sheet_values {
            let spec = &value.field.spec;
            let live = record.get(&spec.name).cloned().unwrap_or(Value::Null);

            let same = if spec.integer {
                identity_equivalent(&live, &value.typed)
            } else {
                self.codec.equivalent(spec, &live, &value.typed)?
            };
            if same {
                continue;
            }

            let old_value = if spec.integer {
                identity_display(&live)
            } else {
                self.codec.to_display(spec, &live)?
            };
            info!(
                id = record.id(),
                field = %spec.name,
                from = %old_value,
                to = %value.raw,
                "Field diverged"
            );

            record.set(&spec.name, value.typed.clone());
            updates.push(FieldUpdate {
                record_id: record.id(),
                field: spec.name.clone(),
                old_value,
                new_value: value.raw.clone(),
            });
        }

        Ok(updates)
    }
}

fn extract(row: &SheetRow<'_>, column: usize, field: &str) -> SyncResult<String> {
    row.cell(column)
        .extract()
        .ok_or_else(|| SyncError::UnparseableCell {
            row: row.number,
            field: field.to_string(),
        })
}

fn parse_integer(row: &SheetRow<'_>, field: &str, raw: &str) -> SyncResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| SyncError::InvalidInteger {
        row: row.number,
        field: field.to_string(),
        value: raw.to_string(),
    })
}
