//! Wire types and request bodies for Drive v3 and Sheets v4.
//!
//! Only the parts of the Google resources this tool reads are modelled.
//! Google omits zero-valued fields (a first sheet's `sheetId` of 0 is
//! simply absent), so numeric fields default.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Cell, Grid};

/// MIME type of native Google spreadsheets in Drive.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Columns in a freshly added sheet.
pub const DEFAULT_SHEET_COLUMNS: usize = 26;

/// Drive `files.list` query for live spreadsheets.
#[must_use]
pub fn spreadsheet_query() -> String {
    format!("mimeType='{SPREADSHEET_MIME_TYPE}' and trashed=false")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub start_row: usize,
    #[serde(default)]
    pub start_column: usize,
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: Option<ExtendedValue>,
    pub effective_value: Option<ExtendedValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub string_value: Option<String>,
    pub number_value: Option<f64>,
    pub bool_value: Option<bool>,
}

impl ExtendedValue {
    fn to_cell(&self) -> Cell {
        if let Some(text) = &self.string_value {
            Cell::Text(text.clone())
        } else if let Some(n) = self.number_value {
            Cell::Number(n)
        } else if let Some(b) = self.bool_value {
            Cell::Text(b.to_string())
        } else {
            Cell::Empty
        }
    }
}

impl CellData {
    /// Computed value when present (formulas), else what the user typed.
    #[must_use]
    pub fn to_cell(&self) -> Cell {
        self.effective_value
            .as_ref()
            .or(self.user_entered_value.as_ref())
            .map_or(Cell::Empty, ExtendedValue::to_cell)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Value>,
}

impl BatchUpdateResponse {
    /// Properties of the sheet created by the first `addSheet` reply.
    #[must_use]
    pub fn added_sheet(&self) -> Option<SheetProperties> {
        self.replies
            .iter()
            .find_map(|reply| reply.pointer("/addSheet/properties"))
            .and_then(|props| serde_json::from_value(props.clone()).ok())
    }
}

/// Convert the first sheet's grid data into a [`Grid`].
///
/// Row 1 becomes the header. Trailing rows with no values (formatting-only
/// rows) are dropped.
#[must_use]
pub fn grid_from_sheet(sheet: &Sheet) -> Grid {
    let Some(data) = sheet.data.first() else {
        return Grid::default();
    };

    let mut rows: Vec<Vec<Cell>> = std::iter::repeat_with(Vec::new)
        .take(data.start_row)
        .chain(data.row_data.iter().map(|row| {
            std::iter::repeat_n(Cell::Empty, data.start_column)
                .chain(row.values.iter().map(CellData::to_cell))
                .collect::<Vec<_>>()
        }))
        .collect();

    while rows
        .last()
        .is_some_and(|row| row.iter().all(|cell| cell.extract().is_none()))
    {
        rows.pop();
    }

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();
    Grid {
        header,
        rows: rows.collect(),
    }
}

fn cell_data(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => json!({}),
        Cell::Text(text) => json!({"userEnteredValue": {"stringValue": text}}),
        Cell::Number(n) => json!({"userEnteredValue": {"numberValue": n}}),
    }
}

/// `RowData` list for every row of `grid`, header first.
#[must_use]
pub fn row_data(grid: &Grid) -> Vec<Value> {
    grid.all_rows()
        .map(|cells| json!({"values": cells.iter().map(cell_data).collect::<Vec<_>>()}))
        .collect()
}

/// Body of `spreadsheets.create` with a single populated sheet.
#[must_use]
pub fn create_request(name: &str, sheet_title: &str, grid: &Grid) -> Value {
    json!({
        "properties": {"title": name},
        "sheets": [{
            "properties": {"title": sheet_title},
            "data": [{"rowData": row_data(grid)}]
        }]
    })
}

#[must_use]
pub fn add_sheet(title: &str) -> Value {
    json!({"addSheet": {"properties": {"title": title}}})
}

#[must_use]
pub fn delete_sheet(sheet_id: i64) -> Value {
    json!({"deleteSheet": {"sheetId": sheet_id}})
}

/// Grow a fresh sheet so `columns` fit; `None` when the default suffices.
#[must_use]
pub fn append_columns(sheet_id: i64, columns: usize) -> Option<Value> {
    (columns > DEFAULT_SHEET_COLUMNS).then(|| {
        json!({"appendDimension": {
            "sheetId": sheet_id,
            "dimension": "COLUMNS",
            "length": columns - DEFAULT_SHEET_COLUMNS
        }})
    })
}

/// Hide column A, which holds the record id.
#[must_use]
pub fn hide_id_column(sheet_id: i64) -> Value {
    json!({"updateDimensionProperties": {
        "range": {"sheetId": sheet_id, "dimension": "COLUMNS", "startIndex": 0, "endIndex": 1},
        "properties": {"hiddenByUser": true},
        "fields": "hiddenByUser"
    }})
}

#[must_use]
pub fn append_cells(sheet_id: i64, grid: &Grid) -> Value {
    json!({"appendCells": {"sheetId": sheet_id, "fields": "*", "rows": row_data(grid)}})
}

/// Shaded, bold, centred 12pt header with row 1 frozen.
#[must_use]
pub fn header_style(sheet_id: i64) -> Vec<Value> {
    vec![
        json!({"repeatCell": {
            "range": {"sheetId": sheet_id, "startRowIndex": 0, "endRowIndex": 1},
            "cell": {"userEnteredFormat": {
                "backgroundColor": {"red": 0.85, "green": 0.85, "blue": 0.85},
                "horizontalAlignment": "CENTER",
                "textFormat": {
                    "foregroundColor": {"red": 0.0, "green": 0.0, "blue": 0.0},
                    "fontSize": 12,
                    "bold": true
                }
            }},
            "fields": "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment)"
        }}),
        json!({"updateSheetProperties": {
            "properties": {"sheetId": sheet_id, "gridProperties": {"frozenRowCount": 1}},
            "fields": "gridProperties.frozenRowCount"
        }}),
    ]
}
