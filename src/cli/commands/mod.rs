//! Command implementations.

pub mod completions;
pub mod export;
pub mod import;
pub mod version;

use crate::cli::FieldsArgs;
use crate::error::{Error, Result};
use crate::sync::FieldSelection;
use crate::validate::validate_selection;

/// Parse and validate `--fields` before any settings or network access.
fn selection(args: &FieldsArgs) -> Result<FieldSelection> {
    Ok(validate_selection(FieldSelection::parse(args.fields.as_slice())?)?)
}

/// Runtime for the async HTTP clients; one per command.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}
