//! shelfsync - edit a WooCommerce catalog in Google Sheets
//!
//! This crate provides the core functionality for the `shelfsync` CLI tool:
//! export every product into a spreadsheet, let people edit it, and import
//! the edits back as product updates.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (records, reference entities, sheet grids)
//! - [`sync`] - Export/import passes, lookup indexes, field codec, reconciler
//! - [`catalog`] - WooCommerce REST client
//! - [`sheets`] - Google Drive/Sheets client
//! - [`config`] - Settings resolution
//! - [`validate`] - Field-name validation and suggestions
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod sheets;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
