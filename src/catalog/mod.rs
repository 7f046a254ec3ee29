//! Catalog service access.
//!
//! The sync drivers only see the [`CatalogService`] trait: fetch every
//! record, write one record back. [`WooCommerceClient`] implements it over
//! the WooCommerce REST API.

mod woocommerce;

use std::future::Future;

use tracing::debug;

use crate::model::CatalogRecord;
use crate::sync::SyncResult;

pub use woocommerce::WooCommerceClient;

/// Read/write access to the product catalog.
pub trait CatalogService: Send + Sync {
    /// Fetch every record, following pagination to the end.
    fn fetch_all_records(&self) -> impl Future<Output = SyncResult<Vec<CatalogRecord>>> + Send;

    /// Replace record `id` with `record` (full-record update).
    fn update_record(
        &self,
        id: i64,
        record: &CatalogRecord,
    ) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Request pages 1, 2, ... until a page comes back shorter than `per_page`.
///
/// # Errors
///
/// Propagates the first page error; records from earlier pages are dropped.
pub async fn collect_pages<F, Fut>(per_page: usize, mut fetch_page: F) -> SyncResult<Vec<CatalogRecord>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = SyncResult<Vec<CatalogRecord>>>,
{
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch_page(page).await?;
        let count = batch.len();
        debug!(page, count, "Fetched catalog page");
        records.extend(batch);

        if count == 0 || count < per_page {
            break;
        }
        page += 1;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn page_of(start: i64, len: usize) -> Vec<CatalogRecord> {
        (start..start + i64::try_from(len).unwrap())
            .map(|id| CatalogRecord::from_value(json!({"id": id})).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_paging_stops_at_short_page() {
        let requested = Mutex::new(Vec::new());
        let records = collect_pages(2, |page| {
            requested.lock().unwrap().push(page);
            let batch = match page {
                1 => page_of(1, 2),
                2 => page_of(3, 2),
                _ => page_of(5, 1),
            };
            async move { Ok(batch) }
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_paging_stops_at_empty_page() {
        let mut calls = 0;
        let records = collect_pages(2, |page| {
            calls += 1;
            let batch = if page == 1 { page_of(1, 2) } else { Vec::new() };
            async move { Ok(batch) }
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_paging_propagates_errors() {
        let result = collect_pages(1, |page| async move {
            if page == 1 {
                Ok(page_of(1, 1))
            } else {
                Err(crate::sync::SyncError::Api {
                    service: "catalog",
                    status: 502,
                    body: String::new(),
                })
            }
        })
        .await;
        assert!(result.is_err());
    }
}
