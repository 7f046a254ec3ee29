//! Google Drive v3 + Sheets v4 client.
//!
//! Drive is only used to find a spreadsheet by name; everything else goes
//! through the Sheets API. Requests carry a bearer access token obtained
//! out of band (see `config`).
//!
//! # Replacing a sheet
//!
//! A spreadsheet must always keep at least one sheet, so clearing one adds
//! a throwaway sheet (titled with the current epoch millis), deletes every
//! original sheet, adds the fresh primary sheet, then drops the throwaway.

use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::api::{self, BatchUpdateResponse, DriveFile, DriveFileList, SheetProperties, Spreadsheet};
use super::{DocumentHandle, GridStore};
use crate::config::SheetSettings;
use crate::http::{build_client, ensure_success};
use crate::model::Grid;
use crate::sync::{SyncError, SyncResult};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE: &str = "Google Drive";
const SHEETS: &str = "Google Sheets";

/// Spreadsheet store backed by a Google account.
pub struct GoogleSheetsClient {
    client: Client,
    access_token: String,
    sheet_title: String,
}

impl GoogleSheetsClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &SheetSettings) -> SyncResult<Self> {
        Ok(Self {
            client: build_client()?,
            access_token: settings.access_token.clone(),
            sheet_title: settings.sheet_title.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    async fn list_spreadsheets(&self) -> SyncResult<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.authorized(self.client.get(DRIVE_FILES_URL)).query(&[
                ("q", api::spreadsheet_query()),
                ("fields", "nextPageToken, files(id, name)".to_string()),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let list: DriveFileList = ensure_success(DRIVE, request.send().await?)
                .await?
                .json()
                .await?;
            files.extend(list.files);

            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = files.len(), "Listed spreadsheets");
        Ok(files)
    }

    async fn get_spreadsheet(&self, id: &str, include_grid_data: bool) -> SyncResult<Spreadsheet> {
        let request = self
            .authorized(self.client.get(format!("{SHEETS_URL}/{id}")))
            .query(&[("includeGridData", include_grid_data)]);
        Ok(ensure_success(SHEETS, request.send().await?)
            .await?
            .json()
            .await?)
    }

    async fn batch_update(&self, id: &str, requests: Vec<Value>) -> SyncResult<BatchUpdateResponse> {
        debug!(spreadsheet = id, requests = requests.len(), "Sheets batch update");
        let request = self
            .authorized(self.client.post(format!("{SHEETS_URL}/{id}:batchUpdate")))
            .json(&json!({ "requests": requests }));
        Ok(ensure_success(SHEETS, request.send().await?)
            .await?
            .json()
            .await?)
    }

    async fn add_sheet(&self, id: &str, requests: Vec<Value>) -> SyncResult<SheetProperties> {
        self.batch_update(id, requests)
            .await?
            .added_sheet()
            .ok_or_else(|| SyncError::UnexpectedResponse {
                service: SHEETS,
                message: "addSheet reply without sheet properties".to_string(),
            })
    }

    /// Delete every sheet and return the freshly added primary sheet.
    async fn clear_spreadsheet(&self, id: &str) -> SyncResult<SheetProperties> {
        let existing = self.get_spreadsheet(id, false).await?;
        let temp_title = Utc::now().timestamp_millis().to_string();
        let temp = self.add_sheet(id, vec![api::add_sheet(&temp_title)]).await?;

        let mut requests: Vec<Value> = existing
            .sheets
            .iter()
            .map(|sheet| api::delete_sheet(sheet.properties.sheet_id))
            .collect();
        requests.push(api::add_sheet(&self.sheet_title));
        let primary = self.add_sheet(id, requests).await?;

        self.batch_update(id, vec![api::delete_sheet(temp.sheet_id)])
            .await?;
        debug!(
            spreadsheet = id,
            removed = existing.sheets.len(),
            sheet_id = primary.sheet_id,
            "Cleared spreadsheet"
        );
        Ok(primary)
    }

    async fn first_sheet_id(&self, doc: &DocumentHandle) -> SyncResult<i64> {
        let spreadsheet = self.get_spreadsheet(&doc.id, false).await?;
        spreadsheet
            .sheets
            .first()
            .map(|sheet| sheet.properties.sheet_id)
            .ok_or_else(|| SyncError::UnexpectedResponse {
                service: SHEETS,
                message: format!("spreadsheet {} has no sheets", doc.id),
            })
    }
}

impl GridStore for GoogleSheetsClient {
    async fn find_document_by_name(&self, name: &str) -> SyncResult<Option<DocumentHandle>> {
        let found = self
            .list_spreadsheets()
            .await?
            .into_iter()
            .find(|file| file.name == name)
            .map(|file| DocumentHandle::new(file.id, file.name));
        debug!(name, found = found.is_some(), "Looked up spreadsheet");
        Ok(found)
    }

    async fn create_document(&self, name: &str, grid: &Grid) -> SyncResult<DocumentHandle> {
        let request = self
            .authorized(self.client.post(SHEETS_URL))
            .json(&api::create_request(name, &self.sheet_title, grid));
        let created: Spreadsheet = ensure_success(SHEETS, request.send().await?)
            .await?
            .json()
            .await?;

        let doc = DocumentHandle::new(created.spreadsheet_id, name);
        if let Some(sheet) = created.sheets.first() {
            self.batch_update(&doc.id, vec![api::hide_id_column(sheet.properties.sheet_id)])
                .await?;
        }
        info!(id = %doc.id, name, "Created spreadsheet");
        Ok(doc)
    }

    async fn replace_primary_sheet(&self, doc: &DocumentHandle, grid: &Grid) -> SyncResult<()> {
        let sheet = self.clear_spreadsheet(&doc.id).await?;

        let mut requests: Vec<Value> = api::append_columns(sheet.sheet_id, grid.width())
            .into_iter()
            .collect();
        requests.push(api::hide_id_column(sheet.sheet_id));
        requests.push(api::append_cells(sheet.sheet_id, grid));
        self.batch_update(&doc.id, requests).await?;

        info!(id = %doc.id, rows = grid.rows.len(), "Replaced primary sheet");
        Ok(())
    }

    async fn read_primary_sheet_grid(&self, doc: &DocumentHandle) -> SyncResult<Grid> {
        let spreadsheet = self.get_spreadsheet(&doc.id, true).await?;
        let grid = spreadsheet
            .sheets
            .first()
            .map(api::grid_from_sheet)
            .unwrap_or_default();
        debug!(id = %doc.id, rows = grid.rows.len(), "Read primary sheet");
        Ok(grid)
    }

    async fn apply_header_style(&self, doc: &DocumentHandle) -> SyncResult<()> {
        let sheet_id = self.first_sheet_id(doc).await?;
        self.batch_update(&doc.id, api::header_style(sheet_id)).await?;
        Ok(())
    }
}
