//! Import command: spreadsheet edits → catalog.

use colored::Colorize;

use super::{runtime, selection};
use crate::catalog::WooCommerceClient;
use crate::cli::ImportArgs;
use crate::config::{resolve_settings, Overrides};
use crate::error::Result;
use crate::model::FieldUpdate;
use crate::sheets::GoogleSheetsClient;
use crate::sync::{ImportStats, Importer, PassOutcome};

/// Execute the import command.
///
/// Each divergent field is printed as it is found. In JSON mode the
/// divergences are collected and printed with the final stats.
///
/// # Errors
///
/// Returns an error for an invalid field list, missing settings, or any
/// failure during the pass. Updates sent before a failure are not undone.
pub fn execute(args: &ImportArgs, overrides: &Overrides, json: bool, quiet: bool) -> Result<()> {
    let selection = selection(&args.fields)?;
    let settings = resolve_settings(overrides)?;

    if args.dry_run && !json && !quiet {
        println!("{}", "TEST MODE - no changes will be made".yellow().bold());
    }

    let catalog = WooCommerceClient::new(&settings.catalog)?;
    let sheets = GoogleSheetsClient::new(&settings.sheets)?;
    let importer = Importer::new(&catalog, &sheets, &settings.sheets.spreadsheet_name)
        .dry_run(args.dry_run);

    let mut updates: Vec<FieldUpdate> = Vec::new();
    let outcome = runtime()?.block_on(importer.import(&selection, |update| {
        if json {
            updates.push(update.clone());
        } else if !quiet {
            print_update(update);
        }
    }))?;

    match outcome {
        PassOutcome::EmptyCatalog => {
            if json {
                let output = serde_json::json!({"success": true, "empty": true});
                println!("{}", serde_json::to_string(&output)?);
            } else if !quiet {
                println!("WooCommerce returned no products; nothing imported.");
            }
        }
        PassOutcome::Completed(stats) => {
            if json {
                let output = serde_json::json!({
                    "success": true,
                    "spreadsheet": settings.sheets.spreadsheet_name,
                    "stats": stats,
                    "updates": updates,
                });
                println!("{}", serde_json::to_string(&output)?);
            } else if !quiet {
                print_summary(&stats);
            }
        }
    }

    Ok(())
}

fn print_update(update: &FieldUpdate) {
    println!(
        "{} {}: \"{}\" → \"{}\"",
        format!("#{}", update.record_id).cyan(),
        update.field.bold(),
        update.old_value.red(),
        update.new_value.green()
    );
}

fn print_summary(stats: &ImportStats) {
    println!();
    if stats.is_clean() {
        println!("{} Sheet matches the catalog; nothing to update.", "✓".green());
    } else if stats.dry_run {
        println!(
            "{} {} field(s) differ across {} product(s); nothing sent.",
            "!".yellow(),
            stats.fields_changed,
            stats.records_changed
        );
    } else {
        println!(
            "{} Updated {} product(s) ({} field(s)).",
            "✓".green(),
            stats.updates_sent,
            stats.fields_changed
        );
    }
    println!(
        "  Rows: {} ({} matched, {} without a product)",
        stats.rows, stats.matched_rows, stats.unmatched_rows
    );
}
