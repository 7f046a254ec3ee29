//! Export command: catalog → spreadsheet.

use colored::Colorize;

use super::{runtime, selection};
use crate::catalog::WooCommerceClient;
use crate::cli::FieldsArgs;
use crate::config::{resolve_settings, Overrides};
use crate::error::Result;
use crate::sheets::GoogleSheetsClient;
use crate::sync::{Exporter, PassOutcome};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error for an invalid field list, missing settings, or any
/// failure during the pass.
pub fn execute(args: &FieldsArgs, overrides: &Overrides, json: bool, quiet: bool) -> Result<()> {
    let selection = selection(args)?;
    let settings = resolve_settings(overrides)?;

    let catalog = WooCommerceClient::new(&settings.catalog)?;
    let sheets = GoogleSheetsClient::new(&settings.sheets)?;
    let exporter = Exporter::new(&catalog, &sheets, &settings.sheets.spreadsheet_name);

    let outcome = runtime()?.block_on(exporter.export(&selection))?;

    match outcome {
        PassOutcome::EmptyCatalog => {
            if json {
                let output = serde_json::json!({"success": true, "empty": true});
                println!("{}", serde_json::to_string(&output)?);
            } else if !quiet {
                println!("WooCommerce returned no products; nothing exported.");
            }
        }
        PassOutcome::Completed(stats) => {
            if json {
                let output = serde_json::json!({
                    "success": true,
                    "spreadsheet": settings.sheets.spreadsheet_name,
                    "stats": stats,
                });
                println!("{}", serde_json::to_string(&output)?);
            } else if !quiet {
                let action = if stats.created { "Created" } else { "Updated" };
                println!(
                    "{} {} \"{}\"",
                    "✓".green(),
                    action,
                    settings.sheets.spreadsheet_name
                );
                println!();
                println!("  Products: {}", stats.records);
                println!("  Columns:  {}", stats.fields.join(", "));
                println!();
                println!("  {}", stats.url.underline());
            }
        }
    }

    Ok(())
}
