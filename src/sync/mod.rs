//! Catalog ↔ spreadsheet sync.
//!
//! - **Export**: catalog records → header + display rows in the primary sheet
//! - **Import**: sheet rows → divergent fields → full-record updates
//! - **Lookup**: category/tag name → entity, rebuilt every pass
//! - **Codec**: per-field display, parse, and equivalence
//!
//! # Architecture
//!
//! Both passes start from a fresh snapshot of every record. Nothing is
//! cached between passes, and the drivers only talk to the outside world
//! through [`CatalogService`](crate::catalog::CatalogService) and
//! [`GridStore`](crate::sheets::GridStore).
//!
//! # Example
//!
//! ```ignore
//! use shelfsync::sync::{Exporter, FieldSelection, Importer};
//!
//! let selection = FieldSelection::parse(&["price", "categories"])?;
//! Exporter::new(&catalog, &sheets, "WooCommerce-products")
//!     .export(&selection)
//!     .await?;
//!
//! Importer::new(&catalog, &sheets, "WooCommerce-products")
//!     .dry_run(true)
//!     .import(&selection, |update| println!("{update:?}"))
//!     .await?;
//! ```

mod codec;
mod export;
mod import;
mod lookup;
mod reconcile;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{
    identity_display, identity_equivalent, FieldCodec, FieldSpec,
    FieldStrategy, INTEGER_FIELDS,
};
pub use export::{build_grid, Exporter};
pub use import::Importer;
pub use lookup::{LookupIndex, LookupIndexes};
pub use reconcile::{RecordChange, Reconciler, RowOutcome};
pub use types::{
    ErrorCategory, ExportStats, FieldSelection, ImportStats, PassOutcome, SyncError, SyncResult,
};
