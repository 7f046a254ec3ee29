//! Catalog → spreadsheet export.
//!
//! # Snapshot Mode
//!
//! An export always writes the full current catalog: the primary sheet of
//! the destination document is dropped and rebuilt, so the sheet never
//! carries rows from a previous export.
//!
//! # Failure ordering
//!
//! The grid is built completely before the spreadsheet is touched. A
//! selected field missing from any record fails the pass with nothing
//! written.

use tracing::info;

use crate::catalog::CatalogService;
use crate::model::{CatalogRecord, Cell, Grid};
use crate::sheets::GridStore;
use crate::sync::codec::{FieldCodec, FieldSpec};
use crate::sync::types::{ExportStats, FieldSelection, PassOutcome, SyncError, SyncResult};

/// Writes the catalog into a named spreadsheet.
pub struct Exporter<'a, C, G> {
    catalog: &'a C,
    grid: &'a G,
    document_name: &'a str,
}

impl<'a, C: CatalogService, G: GridStore> Exporter<'a, C, G> {
    #[must_use]
    pub const fn new(catalog: &'a C, grid: &'a G, document_name: &'a str) -> Self {
        Self {
            catalog,
            grid,
            document_name,
        }
    }

    /// Export every record's selected fields.
    ///
    /// The destination is created if no spreadsheet has the configured
    /// name; otherwise its primary sheet is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a remote call fails
    /// - a selected field is missing from a record
    /// - a reference field holds a malformed value
    pub async fn export(&self, selection: &FieldSelection) -> SyncResult<PassOutcome<ExportStats>> {
        let records = self.catalog.fetch_all_records().await?;
        let Some(first) = records.first() else {
            info!("Catalog returned no products");
            return Ok(PassOutcome::EmptyCatalog);
        };

        let fields = selection.export_fields(first);
        let grid = build_grid(&records, &fields, &FieldCodec::default())?;

        let (doc, created) = match self.grid.find_document_by_name(self.document_name).await? {
            Some(doc) => {
                self.grid.replace_primary_sheet(&doc, &grid).await?;
                (doc, false)
            }
            None => (
                self.grid.create_document(self.document_name, &grid).await?,
                true,
            ),
        };
        self.grid.apply_header_style(&doc).await?;

        info!(
            records = records.len(),
            fields = fields.len(),
            document = %doc.id,
            created,
            "Export complete"
        );

        Ok(PassOutcome::Completed(ExportStats {
            records: records.len(),
            fields,
            url: doc.url(),
            document_id: doc.id,
            created,
        }))
    }
}

/// Header of field names plus one display row per record.
///
/// # Errors
///
/// Returns [`SyncError::FieldMissingFromRecord`] for the first record that
/// lacks a selected field.
pub fn build_grid(records: &[CatalogRecord], fields: &[String], codec: &FieldCodec) -> SyncResult<Grid> {
    let specs = FieldSpec::for_names(fields);
    let header = fields.iter().map(Cell::text).collect();

    let rows = records
        .iter()
        .map(|record| {
            specs
                .iter()
                .map(|spec| {
                    let value = record.get(&spec.name).ok_or_else(|| {
                        SyncError::FieldMissingFromRecord {
                            field: spec.name.clone(),
                            record_id: record.id(),
                        }
                    })?;
                    codec.to_display(spec, value).map(Cell::Text)
                })
                .collect::<SyncResult<Vec<_>>>()
        })
        .collect::<SyncResult<Vec<_>>>()?;

    Ok(Grid { header, rows })
}
