//! Spreadsheet storage.
//!
//! [`GridStore`] is what the sync drivers need from a spreadsheet service:
//! find a document by name, create one, overwrite or read its primary
//! sheet, and style the header row. [`GoogleSheetsClient`] implements it
//! with Drive v3 and Sheets v4.

pub mod api;
mod google;

use std::future::Future;

use serde::Serialize;

use crate::model::Grid;
use crate::sync::SyncResult;

pub use google::GoogleSheetsClient;

/// A spreadsheet document located by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHandle {
    pub id: String,
    pub name: String,
}

impl DocumentHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Browser URL of the document.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.id)
    }
}

/// Read/write access to spreadsheet documents.
pub trait GridStore: Send + Sync {
    /// First non-trashed spreadsheet whose name matches exactly.
    fn find_document_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = SyncResult<Option<DocumentHandle>>> + Send;

    /// Create a document whose primary sheet holds `grid`.
    fn create_document(
        &self,
        name: &str,
        grid: &Grid,
    ) -> impl Future<Output = SyncResult<DocumentHandle>> + Send;

    /// Drop every sheet of `doc` and write `grid` to a fresh primary sheet.
    fn replace_primary_sheet(
        &self,
        doc: &DocumentHandle,
        grid: &Grid,
    ) -> impl Future<Output = SyncResult<()>> + Send;

    /// Read the first sheet: row 1 is the header.
    fn read_primary_sheet_grid(
        &self,
        doc: &DocumentHandle,
    ) -> impl Future<Output = SyncResult<Grid>> + Send;

    /// Freeze and emphasise the header row of the first sheet.
    fn apply_header_style(&self, doc: &DocumentHandle) -> impl Future<Output = SyncResult<()>> + Send;
}
