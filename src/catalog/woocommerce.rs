//! WooCommerce REST API client (`/wp-json/wc/v3`).
//!
//! Authenticates with `consumer_key` / `consumer_secret` query parameters,
//! which WooCommerce accepts over HTTPS.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{collect_pages, CatalogService};
use crate::config::CatalogSettings;
use crate::http::{build_client, ensure_success};
use crate::model::CatalogRecord;
use crate::sync::SyncResult;

const SERVICE: &str = "WooCommerce";

/// Products endpoint client.
pub struct WooCommerceClient {
    client: Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    per_page: usize,
}

impl WooCommerceClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &CatalogSettings) -> SyncResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            per_page: settings.per_page.max(1),
        })
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn product_url(&self, id: i64) -> String {
        format!("{}/products/{id}", self.base_url)
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [
            ("consumer_key", self.consumer_key.as_str()),
            ("consumer_secret", self.consumer_secret.as_str()),
        ]
    }

    async fn fetch_page(&self, page: u32) -> SyncResult<Vec<CatalogRecord>> {
        let response = self
            .client
            .get(self.products_url())
            .query(&self.auth())
            .query(&[("page", page.to_string()), ("per_page", self.per_page.to_string())])
            .send()
            .await?;

        let values: Vec<Value> = ensure_success(SERVICE, response).await?.json().await?;
        values.into_iter().map(CatalogRecord::from_value).collect()
    }
}

impl CatalogService for WooCommerceClient {
    async fn fetch_all_records(&self) -> SyncResult<Vec<CatalogRecord>> {
        debug!(url = %self.products_url(), per_page = self.per_page, "Fetching products");
        let records = collect_pages(self.per_page, |page| self.fetch_page(page)).await?;
        info!(count = records.len(), "Fetched products");
        Ok(records)
    }

    async fn update_record(&self, id: i64, record: &CatalogRecord) -> SyncResult<()> {
        let response = self
            .client
            .put(self.product_url(id))
            .query(&self.auth())
            .json(record)
            .send()
            .await?;

        ensure_success(SERVICE, response).await?;
        debug!(id, "Updated product");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CatalogSettings {
        CatalogSettings {
            base_url: "https://shop.example.com/wp-json/wc/v3/".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: "cs_test".to_string(),
            per_page: 0,
        }
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = WooCommerceClient::new(&settings()).unwrap();
        assert_eq!(
            client.products_url(),
            "https://shop.example.com/wp-json/wc/v3/products"
        );
        assert_eq!(
            client.product_url(42),
            "https://shop.example.com/wp-json/wc/v3/products/42"
        );
    }

    #[test]
    fn test_page_size_is_at_least_one() {
        let client = WooCommerceClient::new(&settings()).unwrap();
        assert_eq!(client.per_page, 1);
    }
}
