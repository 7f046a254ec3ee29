//! Data models for shelfsync.
//!
//! - [`CatalogRecord`], [`ReferenceEntity`], [`FieldUpdate`] for the catalog side
//! - [`Grid`], [`Cell`], [`HeaderMap`] for the spreadsheet side

pub mod grid;
pub mod record;

pub use grid::{format_number, Cell, Grid, HeaderMap, SheetRow};
pub use record::{value_kind, CatalogRecord, FieldUpdate, ReferenceEntity, ReferenceKind};
