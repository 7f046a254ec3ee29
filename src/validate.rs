//! Field-name validation for `--fields`.
//!
//! Provides an O(1) set of WooCommerce product fields and a synonym map so
//! operators can type `category` or `qty`. Three-tier resolution: exact
//! match → synonym lookup → error with suggestion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use tracing::info;

use crate::sync::{FieldSelection, SyncError, SyncResult};

/// Top-level fields of a WooCommerce product, as returned by `/products`.
pub const KNOWN_PRODUCT_FIELDS: &[&str] = &[
    "_links",
    "aioseo_notices",
    "attributes",
    "average_rating",
    "backordered",
    "backorders",
    "backorders_allowed",
    "button_text",
    "catalog_visibility",
    "categories",
    "cross_sell_ids",
    "date_created",
    "date_created_gmt",
    "date_modified",
    "date_modified_gmt",
    "date_on_sale_from",
    "date_on_sale_from_gmt",
    "date_on_sale_to",
    "date_on_sale_to_gmt",
    "default_attributes",
    "description",
    "dimensions",
    "download_expiry",
    "download_limit",
    "downloadable",
    "downloads",
    "external_url",
    "featured",
    "grouped_products",
    "has_options",
    "id",
    "images",
    "low_stock_amount",
    "manage_stock",
    "menu_order",
    "meta_data",
    "name",
    "on_sale",
    "parent_id",
    "permalink",
    "price",
    "price_html",
    "purchasable",
    "purchase_note",
    "rating_count",
    "regular_price",
    "related_ids",
    "reviews_allowed",
    "sale_price",
    "shipping_class",
    "shipping_class_id",
    "shipping_required",
    "shipping_taxable",
    "short_description",
    "sku",
    "slug",
    "sold_individually",
    "status",
    "stock_quantity",
    "stock_status",
    "tags",
    "tax_class",
    "tax_status",
    "total_sales",
    "type",
    "upsell_ids",
    "variations",
    "virtual",
    "weight",
];

// ── Valid value set (O(1) lookups) ───────────────────────────

pub static VALID_FIELDS: LazyLock<HashSet<&str>> =
    LazyLock::new(|| KNOWN_PRODUCT_FIELDS.iter().copied().collect());

// ── Synonym map (typo recovery) ──────────────────────────────

pub static FIELD_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("category", "categories"),
        ("tag", "tags"),
        ("title", "name"),
        ("qty", "stock_quantity"),
        ("quantity", "stock_quantity"),
        ("stock", "stock_quantity"),
        ("order", "menu_order"),
        ("position", "menu_order"),
        ("image", "images"),
        ("desc", "description"),
        ("summary", "short_description"),
        ("visibility", "catalog_visibility"),
        ("sale", "sale_price"),
        ("upsells", "upsell_ids"),
        ("cross_sells", "cross_sell_ids"),
        ("attribute", "attributes"),
        ("variation", "variations"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a field name.
///
/// Returns the canonical name, or `Err((input, suggestion))`.
pub fn normalize_field(input: &str) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    if VALID_FIELDS.contains(lower.as_str()) {
        return Ok(lower);
    }

    if let Some(&canonical) = FIELD_SYNONYMS.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    let suggestion = find_closest_match(&lower);
    Err((input.to_string(), suggestion))
}

/// Check every named field of a selection, rewriting synonyms.
///
/// `*` passes through untouched. Duplicates created by synonym rewriting
/// (`category` and `categories`) collapse to one.
///
/// # Errors
///
/// Returns [`SyncError::UnrecognizedField`] for the first unknown name.
pub fn validate_selection(selection: FieldSelection) -> SyncResult<FieldSelection> {
    let FieldSelection::Named(names) = selection else {
        return Ok(selection);
    };

    let mut fields: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let canonical = normalize_field(&name)
            .map_err(|(field, suggestion)| SyncError::UnrecognizedField { field, suggestion })?;
        if canonical != name {
            info!(from = %name, to = %canonical, "Normalized field name");
        }
        if !fields.contains(&canonical) {
            fields.push(canonical);
        }
    }

    Ok(FieldSelection::Named(fields))
}

/// Find the closest known field or synonym within edit distance 3.
///
/// Ties go to the earlier entry of [`KNOWN_PRODUCT_FIELDS`], then to
/// synonyms in alphabetical order.
fn find_closest_match(input: &str) -> Option<String> {
    let mut synonyms: Vec<(&str, &str)> = FIELD_SYNONYMS.iter().map(|(&k, &v)| (k, v)).collect();
    synonyms.sort_unstable();

    let mut best: Option<(&str, usize)> = None;
    let candidates = KNOWN_PRODUCT_FIELDS
        .iter()
        .map(|&field| (field, field))
        .chain(synonyms);

    for (candidate, canonical) in candidates {
        let dist = levenshtein_distance(input, candidate);
        if dist <= 3 && best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((canonical, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

/// Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
