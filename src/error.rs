//! Error types for the shelfsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Every error is fatal to the pass that raised it and exits with status 1.

use thiserror::Error;

use crate::model::ReferenceKind;
use crate::sync::{ErrorCategory, SyncError};

/// Result type alias for shelfsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes.
///
/// Each code maps to a SCREAMING_SNAKE string. Scripts match on the string;
/// the exit status is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration
    ConfigError,
    MissingSetting,
    UnrecognizedField,
    InvalidArgument,

    // Not found
    NotFound,
    ReferenceNotFound,
    DocumentNotFound,

    // Data integrity
    DataIntegrity,

    // Transport
    TransportError,
    UpdateFailed,

    // I/O
    IoError,
    JsonError,

    // Internal
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingSetting => "MISSING_SETTING",
            Self::UnrecognizedField => "UNRECOGNIZED_FIELD",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::ReferenceNotFound => "REFERENCE_NOT_FOUND",
            Self::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Self::DataIntegrity => "DATA_INTEGRITY",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Process exit status. No partial-success tier exists.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        1
    }

    /// Whether re-running (possibly with corrected input) can succeed.
    ///
    /// True for mistyped fields and arguments and for transport failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedField
                | Self::InvalidArgument
                | Self::MissingSetting
                | Self::TransportError
                | Self::UpdateFailed
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in shelfsync CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Missing setting: {name}")]
    MissingSetting {
        name: &'static str,
        env: &'static str,
        key: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Sync(err) => match err {
                SyncError::UnrecognizedField { .. } | SyncError::FieldMissingFromRecord { .. } => {
                    ErrorCode::UnrecognizedField
                }
                SyncError::InvalidSelection(_) => ErrorCode::InvalidArgument,
                SyncError::ReferenceNotFound { .. } => ErrorCode::ReferenceNotFound,
                SyncError::DocumentNotFound { .. } => ErrorCode::DocumentNotFound,
                SyncError::UpdateFailed { .. } => ErrorCode::UpdateFailed,
                other => match other.category() {
                    ErrorCategory::Configuration => ErrorCode::ConfigError,
                    ErrorCategory::NotFound => ErrorCode::NotFound,
                    ErrorCategory::DataIntegrity => ErrorCode::DataIntegrity,
                    ErrorCategory::Transport => ErrorCode::TransportError,
                },
            },
            Self::MissingSetting { .. } => ErrorCode::MissingSetting,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Broad class of the failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Sync(err) => err.category(),
            Self::MissingSetting { .. } | Self::InvalidArgument(_) | Self::Config(_) => {
                ErrorCategory::Configuration
            }
            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::DataIntegrity,
        }
    }

    /// Process exit status, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Sync(err) => sync_hint(err),

            Self::MissingSetting { env, key, .. } => Some(format!(
                "Set {env} in the environment (or a .env file), \
                 or \"{key}\" in ~/.shelfsync/config.json"
            )),

            Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, category, message, retryability, exit code,
    /// and optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "category": self.category(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

fn sync_hint(err: &SyncError) -> Option<String> {
    match err {
        SyncError::UnrecognizedField {
            suggestion: Some(suggestion),
            ..
        } => Some(format!("Did you mean: {suggestion}?")),
        SyncError::UnrecognizedField { .. } => Some(
            "Use WooCommerce product field names such as name, price, sku, categories, \
             or `*` for every field"
                .to_string(),
        ),
        SyncError::FieldMissingFromRecord { .. } => Some(
            "Not every product has this field. Pick fields present on all products, or `*`."
                .to_string(),
        ),
        SyncError::FieldMissingFromSheet { .. } => Some(
            "Run `shelfsync export` with this field so the sheet has a column for it".to_string(),
        ),
        SyncError::DuplicateReferenceName { kind, .. } | SyncError::UnnamedReference { kind, .. } => {
            Some(format!(
                "Give every {kind} a unique, non-empty name in WooCommerce, then re-run"
            ))
        }
        SyncError::ReferenceNotFound { kind, known, .. } => Some(reference_hint(*kind, known)),
        SyncError::DocumentNotFound { name } => Some(format!(
            "Run `shelfsync export` first to create \"{name}\", or point --spreadsheet at an existing one"
        )),
        SyncError::UnparseableCell { .. } | SyncError::InvalidInteger { .. } => {
            Some("Fill in or fix the cell (or delete the row), then re-run the import".to_string())
        }
        SyncError::Api {
            status: 401 | 403, ..
        } => Some(
            "Check credentials: WooCommerce consumer key/secret, or refresh the Google access token"
                .to_string(),
        ),
        SyncError::UpdateFailed { .. } => Some(
            "Rows before this one were already written; re-running the import continues from the sheet"
                .to_string(),
        ),
        _ => None,
    }
}

/// Most names listed in a reference hint before the rest are counted.
const HINT_NAME_LIMIT: usize = 10;

fn reference_hint(kind: ReferenceKind, known: &[String]) -> String {
    let rule =
        format!("Names are case-sensitive and must match a {kind} already attached to some product");
    if known.is_empty() {
        return format!("{rule}; no product has a {kind} yet");
    }

    let mut listed = known
        .iter()
        .take(HINT_NAME_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if known.len() > HINT_NAME_LIMIT {
        listed.push_str(&format!(" (and {} more)", known.len() - HINT_NAME_LIMIT));
    }
    format!("{rule}. Known: {listed}")
}
