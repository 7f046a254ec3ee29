//! Field conversion between catalog values and sheet strings.
//!
//! Every field has a [`FieldStrategy`]. A strategy knows three things:
//!
//! - **display**: typed catalog value → the string shown in the sheet
//! - **parse**: sheet string → typed value to send back to the catalog
//! - **equivalence**: whether a sheet value and a live value mean the same
//!
//! # Strategies
//!
//! | Strategy | Fields | Display | Equivalence |
//! |---|---|---|---|
//! | `Identity` | everything else | value as text | loose (see [`identity_equivalent`]) |
//! | `ReferenceList` | `categories`, `tags` | sorted names, `", "`-joined | equal canonical strings |
//!
//! The canonical reference-list string sorts names case-insensitively, so
//! reordering names in the sheet is never a change.

use serde_json::{Number, Value};

use crate::model::{format_number, value_kind, ReferenceEntity, ReferenceKind};
use crate::sync::lookup::LookupIndexes;
use crate::sync::types::{SyncError, SyncResult};

/// Fields stored as integers by the catalog; sheet text is parsed before comparing.
pub const INTEGER_FIELDS: &[&str] = &["id", "menu_order"];

/// Conversion strategy for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Pass-through with loose equality.
    Identity,
    /// List of `{id, name}` entities shown as names.
    ReferenceList(ReferenceKind),
}

/// A field name with its conversion metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub strategy: FieldStrategy,
    /// Sheet text is parsed to `i64` independently of the strategy.
    pub integer: bool,
}

impl FieldSpec {
    /// Metadata for a catalog field name.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        let strategy = ReferenceKind::for_field(name)
            .map_or(FieldStrategy::Identity, FieldStrategy::ReferenceList);
        Self {
            name: name.to_string(),
            strategy,
            integer: INTEGER_FIELDS.contains(&name),
        }
    }

    /// Specs for a list of field names.
    #[must_use]
    pub fn for_names<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        names.iter().map(|n| Self::for_name(n.as_ref())).collect()
    }
}

/// Converts and compares field values for one pass.
///
/// Holds the pass's lookup indexes; an export only displays values and uses
/// [`FieldCodec::default`] with empty indexes.
#[derive(Debug, Clone, Default)]
pub struct FieldCodec {
    indexes: LookupIndexes,
}

impl FieldCodec {
    #[must_use]
    pub const fn new(indexes: LookupIndexes) -> Self {
        Self { indexes }
    }

    /// Catalog value → sheet string.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedValue`] if a reference field does not
    /// hold a list of named objects.
    pub fn to_display(&self, spec: &FieldSpec, value: &Value) -> SyncResult<String> {
        match spec.strategy {
            FieldStrategy::Identity => Ok(identity_display(value)),
            FieldStrategy::ReferenceList(_) => {
                Ok(canonical_names(reference_names(&spec.name, value)?))
            }
        }
    }

    /// Sheet string → catalog value.
    ///
    /// `raw` must be a JSON string; anything else means a typed value went
    /// down the parse path by mistake.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ParseInputNotString`] for non-string input
    /// - [`SyncError::ReferenceNotFound`] if any listed name does not resolve;
    ///   no partial list is ever returned
    pub fn from_display(&self, spec: &FieldSpec, raw: &Value) -> SyncResult<Value> {
        let Value::String(text) = raw else {
            return Err(SyncError::ParseInputNotString {
                field: spec.name.clone(),
                found: value_kind(raw),
            });
        };

        match spec.strategy {
            FieldStrategy::Identity => Ok(Value::String(text.clone())),
            FieldStrategy::ReferenceList(kind) => {
                let entities = self.parse_reference_list(kind, text)?;
                Ok(Value::Array(
                    entities.iter().map(ReferenceEntity::to_value).collect(),
                ))
            }
        }
    }

    /// Resolve a comma-separated list of names.
    ///
    /// Blank input is the empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ReferenceNotFound`] for the first unknown name.
    pub fn parse_reference_list(
        &self,
        kind: ReferenceKind,
        text: &str,
    ) -> SyncResult<Vec<ReferenceEntity>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let index = self.indexes.get(kind);
        text.split(',')
            .map(|name| index.resolve(name).cloned())
            .collect()
    }

    /// Whether a live value and a sheet value are the same for this field.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedValue`] if a reference field value is
    /// not a list of named objects.
    pub fn equivalent(&self, spec: &FieldSpec, live: &Value, sheet: &Value) -> SyncResult<bool> {
        match spec.strategy {
            FieldStrategy::Identity => Ok(identity_equivalent(live, sheet)),
            FieldStrategy::ReferenceList(_) => Ok(self.to_display(spec, live)?
                == self.to_display(spec, sheet)?),
        }
    }
}

/// Identity display: strings as-is, numbers without a spurious `.0`,
/// `true`/`false`, `null`, and compact JSON for structured values.
#[must_use]
pub fn identity_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_display(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn number_display(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        n.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), format_number)
    }
}

/// Loose equality for pass-through fields.
///
/// - number vs number: numeric equality
/// - number vs string: the trimmed string parses to the same number
/// - string vs string: exact equality
/// - anything else: equal display strings (`true` ≡ `"true"`, `null` ≡ `"null"`)
#[must_use]
pub fn identity_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            numeric_string_equals(s, n)
        }
        _ => identity_display(a) == identity_display(b),
    }
}

fn numeric_string_equals(text: &str, n: &Number) -> bool {
    let text = text.trim();
    if let (Ok(parsed), Some(n)) = (text.parse::<i64>(), n.as_i64()) {
        return parsed == n;
    }
    match (text.parse::<f64>(), n.as_f64()) {
        (Ok(parsed), Some(n)) => parsed.is_finite() && parsed == n,
        _ => false,
    }
}

/// Sort names case-insensitively (case preserved) and join with `", "`.
///
/// Names equal up to case are ordered by their exact text so that every
/// permutation of a list has the same canonical string.
fn canonical_names(mut names: Vec<&str>) -> String {
    names.sort_by_cached_key(|name| (name.to_lowercase(), *name));
    names.join(", ")
}

/// Names of the entities in a JSON reference list; `null` is the empty list.
fn reference_names<'v>(field: &str, value: &'v Value) -> SyncResult<Vec<&'v str>> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => {
            return Err(SyncError::MalformedValue {
                field: field.to_string(),
                message: format!("expected a list, got {}", value_kind(other)),
            });
        }
    };

    entries
        .iter()
        .map(|entry| {
            entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| SyncError::MalformedValue {
                    field: field.to_string(),
                    message: format!("list entry without a name: {entry}"),
                })
        })
        .collect()
}
