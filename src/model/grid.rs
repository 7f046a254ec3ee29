//! Spreadsheet grid model.
//!
//! A grid is a header row plus data rows. Cells carry what the sheet stores
//! as user-entered values: text, a number, or nothing.

use std::collections::HashMap;

use serde::Serialize;

/// A single sheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Raw value of the cell for comparison.
    ///
    /// Non-empty text wins, then the numeric value. Empty cells and empty
    /// text yield `None`. Whitespace-only text is a value: a `" "` cell is
    /// how a list field is cleared.
    #[must_use]
    pub fn extract(&self) -> Option<String> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text.clone()),
            Self::Number(n) if n.is_finite() => Some(format_number(*n)),
            _ => None,
        }
    }
}

/// Render a sheet number the way it is displayed (`12`, not `12.0`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Header row plus data rows of a sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Grid {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Build a text-only grid.
    #[must_use]
    pub fn from_text(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header: header.into_iter().map(Cell::Text).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Cell::Text).collect())
                .collect(),
        }
    }

    /// Widest row, header included.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    /// Header first, then every data row.
    pub fn all_rows(&self) -> impl Iterator<Item = &[Cell]> {
        std::iter::once(self.header.as_slice()).chain(self.rows.iter().map(Vec::as_slice))
    }

    /// Data rows with their 1-based sheet row number (the header is row 1).
    pub fn sheet_rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.rows.iter().enumerate().map(|(i, cells)| SheetRow {
            number: i + 2,
            cells,
        })
    }
}

/// Field name → column index, read from a header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Map every non-blank header cell to its column; first occurrence wins.
    #[must_use]
    pub fn from_header(header: &[Cell]) -> Self {
        let mut columns = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            let Some(name) = cell.extract() else {
                continue;
            };
            let name = name.trim();
            if !name.is_empty() {
                columns.entry(name.to_string()).or_insert(index);
            }
        }
        Self { columns }
    }

    #[must_use]
    pub fn column(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A borrowed data row.
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    /// 1-based row number as shown in the sheet.
    pub number: usize,
    pub cells: &'a [Cell],
}

impl SheetRow<'_> {
    /// Cell at `column`; columns past the end of a short row read as empty.
    #[must_use]
    pub fn cell(&self, column: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.cells.get(column).unwrap_or(EMPTY)
    }
}
