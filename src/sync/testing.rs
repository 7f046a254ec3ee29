//! In-memory catalog and spreadsheet doubles for driver tests.

use std::sync::Mutex;

use serde_json::Value;

use crate::catalog::CatalogService;
use crate::model::{CatalogRecord, Grid};
use crate::sheets::{DocumentHandle, GridStore};
use crate::sync::{SyncError, SyncResult};

pub fn records(values: Vec<Value>) -> Vec<CatalogRecord> {
    values
        .into_iter()
        .map(|v| CatalogRecord::from_value(v).unwrap())
        .collect()
}

#[derive(Default)]
pub struct MemoryCatalog {
    pub records: Vec<CatalogRecord>,
    pub updates: Mutex<Vec<(i64, CatalogRecord)>>,
    pub fail_update_for: Option<i64>,
}

impl MemoryCatalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, CatalogRecord)> {
        self.updates.lock().unwrap().clone()
    }
}

impl CatalogService for MemoryCatalog {
    async fn fetch_all_records(&self) -> SyncResult<Vec<CatalogRecord>> {
        Ok(self.records.clone())
    }

    async fn update_record(&self, id: i64, record: &CatalogRecord) -> SyncResult<()> {
        if self.fail_update_for == Some(id) {
            return Err(SyncError::Api {
                service: "catalog",
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.updates.lock().unwrap().push((id, record.clone()));
        Ok(())
    }
}

/// Spreadsheet store holding documents in a list; every call is logged.
#[derive(Default)]
pub struct MemoryStore {
    pub documents: Mutex<Vec<(DocumentHandle, Grid)>>,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_document(name: &str, grid: Grid) -> Self {
        let store = Self::default();
        store
            .documents
            .lock()
            .unwrap()
            .push((DocumentHandle::new(format!("doc-{name}"), name), grid));
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn grid(&self, name: &str) -> Option<Grid> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|(doc, _)| doc.name == name)
            .map(|(_, grid)| grid.clone())
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GridStore for MemoryStore {
    async fn find_document_by_name(&self, name: &str) -> SyncResult<Option<DocumentHandle>> {
        self.log(format!("find:{name}"));
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|(doc, _)| doc.name == name)
            .map(|(doc, _)| doc.clone()))
    }

    async fn create_document(&self, name: &str, grid: &Grid) -> SyncResult<DocumentHandle> {
        self.log(format!("create:{name}"));
        let doc = DocumentHandle::new(format!("doc-{name}"), name);
        self.documents
            .lock()
            .unwrap()
            .push((doc.clone(), grid.clone()));
        Ok(doc)
    }

    async fn replace_primary_sheet(&self, doc: &DocumentHandle, grid: &Grid) -> SyncResult<()> {
        self.log(format!("replace:{}", doc.name));
        let mut documents = self.documents.lock().unwrap();
        if let Some(entry) = documents.iter_mut().find(|(d, _)| d == doc) {
            entry.1 = grid.clone();
        }
        Ok(())
    }

    async fn read_primary_sheet_grid(&self, doc: &DocumentHandle) -> SyncResult<Grid> {
        self.log(format!("read:{}", doc.name));
        Ok(self.grid(&doc.name).unwrap_or_default())
    }

    async fn apply_header_style(&self, doc: &DocumentHandle) -> SyncResult<()> {
        self.log(format!("style:{}", doc.name));
        Ok(())
    }
}
