//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod commands;

/// shelfsync - edit a WooCommerce catalog in Google Sheets
#[derive(Parser, Debug)]
#[command(name = "shelfsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// WooCommerce REST base URL (e.g. https://shop.example.com/wp-json/wc/v3)
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Spreadsheet name (default: WooCommerce-products)
    #[arg(long, global = true)]
    pub spreadsheet: Option<String>,

    /// Config file (default: ~/.shelfsync/config.json)
    #[arg(long, global = true, env = "SHELFSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Settings given as flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            catalog_url: self.catalog_url.clone(),
            spreadsheet: self.spreadsheet.clone(),
            config_path: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write products into the spreadsheet (replaces its primary sheet)
    Export(FieldsArgs),

    /// Apply spreadsheet edits back to the products
    Import(ImportArgs),

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Fields to sync: `*` for all, or names separated by commas/spaces
    #[arg(short, long, required = true, num_args = 1..)]
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub fields: FieldsArgs,

    /// Report divergences without updating any product
    #[arg(short = 't', long, visible_alias = "test-mode")]
    pub dry_run: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
