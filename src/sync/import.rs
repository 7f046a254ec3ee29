//! Spreadsheet → catalog import.
//!
//! Reads the primary sheet of the named spreadsheet, reconciles it row by
//! row against a fresh catalog snapshot, and writes each changed record
//! back in full.
//!
//! Updates are sent sequentially as rows are processed. A failure aborts
//! the pass; records already written stay written.

use tracing::{debug, info};

use crate::catalog::CatalogService;
use crate::model::{FieldUpdate, HeaderMap};
use crate::sheets::GridStore;
use crate::sync::codec::{FieldCodec, FieldSpec};
use crate::sync::lookup::LookupIndexes;
use crate::sync::reconcile::Reconciler;
use crate::sync::types::{FieldSelection, ImportStats, PassOutcome, SyncError, SyncResult};

/// Applies sheet edits to the catalog.
pub struct Importer<'a, C, G> {
    catalog: &'a C,
    grid: &'a G,
    document_name: &'a str,
    dry_run: bool,
}

impl<'a, C: CatalogService, G: GridStore> Importer<'a, C, G> {
    #[must_use]
    pub const fn new(catalog: &'a C, grid: &'a G, document_name: &'a str) -> Self {
        Self {
            catalog,
            grid,
            document_name,
            dry_run: false,
        }
    }

    /// Detect and report divergences without sending any update.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile the sheet with the catalog.
    ///
    /// `on_update` sees every divergent field as it is found, before the
    /// record is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the lookup indexes cannot be built (empty or duplicate names)
    /// - no spreadsheet has the configured name
    /// - a selected field has no sheet column, or a tracked cell is bad
    /// - a sheet name matches no category/tag
    /// - a remote call fails ([`SyncError::UpdateFailed`] for write-backs)
    pub async fn import<F>(
        &self,
        selection: &FieldSelection,
        mut on_update: F,
    ) -> SyncResult<PassOutcome<ImportStats>>
    where
        F: FnMut(&FieldUpdate) + Send,
    {
        let mut records = self.catalog.fetch_all_records().await?;
        let Some(first) = records.first() else {
            info!("Catalog returned no products");
            return Ok(PassOutcome::EmptyCatalog);
        };

        let codec = FieldCodec::new(LookupIndexes::build(&records)?);
        let specs = FieldSpec::for_names(&selection.import_fields(first));

        let doc = self
            .grid
            .find_document_by_name(self.document_name)
            .await?
            .ok_or_else(|| SyncError::DocumentNotFound {
                name: self.document_name.to_string(),
            })?;
        let grid = self.grid.read_primary_sheet_grid(&doc).await?;

        let header = HeaderMap::from_header(&grid.header);
        let reconciler = Reconciler::new(&codec, &specs, &header)?;
        debug!(
            fields = ?reconciler.field_names().collect::<Vec<_>>(),
            rows = grid.rows.len(),
            "Reconciling sheet"
        );

        let mut stats = ImportStats {
            rows: grid.rows.len(),
            dry_run: self.dry_run,
            ..ImportStats::default()
        };

        for row in grid.sheet_rows() {
            let outcome = reconciler.reconcile_row(&row, &mut records)?;
            if outcome.matched == 0 {
                stats.unmatched_rows += 1;
                continue;
            }
            stats.matched_rows += 1;

            for change in outcome.changes {
                stats.records_changed += 1;
                stats.fields_changed += change.updates.len();
                change.updates.iter().for_each(&mut on_update);

                if self.dry_run {
                    continue;
                }
                self.catalog
                    .update_record(change.record_id, &records[change.index])
                    .await
                    .map_err(|source| SyncError::UpdateFailed {
                        id: change.record_id,
                        source: Box::new(source),
                    })?;
                stats.updates_sent += 1;
            }
        }

        info!(
            rows = stats.rows,
            changed = stats.records_changed,
            sent = stats.updates_sent,
            dry_run = stats.dry_run,
            "Import complete"
        );
        Ok(PassOutcome::Completed(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogRecord, Grid};
    use crate::sync::testing::{records, MemoryCatalog, MemoryStore};
    use serde_json::json;

    const DOC: &str = "WooCommerce-products";

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(records(vec![
            json!({
                "id": 1,
                "name": "Street Deck",
                "price": "10",
                "categories": [{"id": 10, "name": "Decks"}, {"id": 11, "name": "Sale"}]
            }),
            json!({"id": 2, "name": "Wheels", "price": "25", "categories": []}),
        ]))
    }

    fn sheet(rows: &[&[&str]]) -> Grid {
        Grid::from_text(
            vec!["id".into(), "name".into(), "price".into(), "categories".into()],
            rows.iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        )
    }

    async fn run(
        catalog: &MemoryCatalog,
        store: &MemoryStore,
        fields: &[&str],
        dry_run: bool,
    ) -> SyncResult<(PassOutcome<ImportStats>, Vec<FieldUpdate>)> {
        let mut seen = Vec::new();
        let selection = FieldSelection::parse(fields)?;
        let outcome = Importer::new(catalog, store, DOC)
            .dry_run(dry_run)
            .import(&selection, |update| seen.push(update.clone()))
            .await?;
        Ok((outcome, seen))
    }

    fn completed(outcome: PassOutcome<ImportStats>) -> ImportStats {
        match outcome {
            PassOutcome::Completed(stats) => stats,
            PassOutcome::EmptyCatalog => panic!("expected a completed import"),
        }
    }

    #[tokio::test]
    async fn test_changed_price_sends_full_record() {
        let catalog = catalog();
        let store = MemoryStore::with_document(
            DOC,
            sheet(&[&["1", "Street Deck", "12", "Decks, Sale"], &["2", "Wheels", "25", ""]]),
        );

        let (outcome, seen) = run(&catalog, &store, &["price"], false).await.unwrap();
        let stats = completed(outcome);

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.matched_rows, 2);
        assert_eq!(stats.records_changed, 1);
        assert_eq!(stats.updates_sent, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].old_value, "10");
        assert_eq!(seen[0].new_value, "12");

        let sent = catalog.sent();
        assert_eq!(sent.len(), 1);
        let (id, record) = &sent[0];
        assert_eq!(*id, 1);
        assert_eq!(record.get("price"), Some(&json!("12")));
        assert_eq!(record.get("name"), Some(&json!("Street Deck")));
        assert!(record.get("categories").is_some());
    }

    #[tokio::test]
    async fn test_dry_run_reports_but_sends_nothing() {
        let catalog = catalog();
        let store = MemoryStore::with_document(
            DOC,
            sheet(&[&["1", "Deck", "12", "Decks"], &["2", "Wheels", "25", "Sale"]]),
        );

        let (outcome, seen) = run(&catalog, &store, &["*"], true).await.unwrap();
        let stats = completed(outcome);

        assert!(stats.dry_run);
        assert_eq!(stats.records_changed, 2);
        assert_eq!(stats.fields_changed, 4);
        assert_eq!(stats.updates_sent, 0);
        assert_eq!(seen.len(), 4);
        assert!(catalog.sent().is_empty());
    }

    #[tokio::test]
    async fn test_clean_sheet_sends_nothing() {
        let catalog = catalog();
        let store = MemoryStore::with_document(
            DOC,
            sheet(&[&["1", "Street Deck", "10", "Sale, Decks"], &["2", "Wheels", "25", ""]]),
        );

        let (outcome, _) = run(&catalog, &store, &["name", "price", "categories"], false)
            .await
            .unwrap();
        assert!(completed(outcome).is_clean());
        assert!(catalog.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_rows_are_counted() {
        let catalog = catalog();
        let store = MemoryStore::with_document(DOC, sheet(&[&["99", "Gone", "1", "Nope"]]));

        let (outcome, _) = run(&catalog, &store, &["price", "categories"], false)
            .await
            .unwrap();
        let stats = completed(outcome);
        assert_eq!(stats.unmatched_rows, 1);
        assert_eq!(stats.matched_rows, 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let catalog = catalog();
        let store = MemoryStore::default();

        let err = run(&catalog, &store, &["price"], false).await.unwrap_err();
        assert!(matches!(err, SyncError::DocumentNotFound { .. }));
        assert!(catalog.sent().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_a_no_op() {
        let catalog = MemoryCatalog::default();
        let store = MemoryStore::default();

        let (outcome, _) = run(&catalog, &store, &["price"], false).await.unwrap();
        assert!(matches!(outcome, PassOutcome::EmptyCatalog));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_aborts_after_earlier_writes() {
        let mut catalog = catalog();
        catalog.fail_update_for = Some(2);
        let store = MemoryStore::with_document(
            DOC,
            sheet(&[&["1", "Street Deck", "11", ""], &["2", "Wheels", "30", ""]]),
        );

        let err = run(&catalog, &store, &["price"], false).await.unwrap_err();
        assert!(matches!(err, SyncError::UpdateFailed { id: 2, .. }));
        assert_eq!(catalog.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_reference_names_abort_before_reading_sheet() {
        let catalog = MemoryCatalog::new(records(vec![
            json!({"id": 1, "categories": [{"id": 10, "name": "Decks"}]}),
            json!({"id": 2, "categories": [{"id": 12, "name": "Decks"}]}),
        ]));
        let store = MemoryStore::with_document(DOC, sheet(&[]));

        let err = run(&catalog, &store, &["categories"], false).await.unwrap_err();
        assert!(matches!(err, SyncError::DuplicateReferenceName { .. }));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sheet_column_is_fatal() {
        let catalog = catalog();
        let store = MemoryStore::with_document(DOC, sheet(&[&["1", "Deck", "10", ""]]));

        let err = run(&catalog, &store, &["sku"], false).await.unwrap_err();
        assert!(matches!(err, SyncError::FieldMissingFromSheet { .. }));
    }

    #[test]
    fn test_record_helper_keeps_field_order() {
        let record = CatalogRecord::from_value(json!({"id": 1, "b": 1, "a": 2})).unwrap();
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["id", "b", "a"]);
    }
}
