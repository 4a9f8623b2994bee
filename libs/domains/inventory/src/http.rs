//! REST implementation of [`InventoryRepository`]
//!
//! Talks to the inventory service:
//! - `GET  /v1/inventory?status={bool}`
//! - `PUT  /v1/inventory/sku/{sku}/change-status` with `{"status": bool}`

use async_trait::async_trait;
use core_config::InventoryApiConfig;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::error::{InventoryError, InventoryResult};
use crate::models::{ChangeStatus, Item};
use crate::repository::InventoryRepository;

const INVENTORY_PATH: &str = "/v1/inventory";

/// Inventory repository backed by the remote REST service
#[derive(Debug, Clone)]
pub struct HttpInventoryRepository {
    config: InventoryApiConfig,
    client: Client,
}

impl HttpInventoryRepository {
    pub fn new(config: InventoryApiConfig) -> InventoryResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    fn list_url(&self) -> String {
        self.config.endpoint(INVENTORY_PATH)
    }

    fn change_status_url(&self, sku: &str) -> String {
        self.config.endpoint(&format!(
            "{}/sku/{}/change-status",
            INVENTORY_PATH,
            urlencoding::encode(sku)
        ))
    }
}

#[async_trait]
impl InventoryRepository for HttpInventoryRepository {
    #[instrument(skip(self))]
    async fn list_by_status(&self, status: bool) -> InventoryResult<Vec<Item>> {
        let response = self
            .client
            .get(self.list_url())
            .query(&[("status", status)])
            .send()
            .await?;

        let code = response.status();
        if !code.is_success() {
            warn!(status = %code, "Inventory list returned non-success status");
            return Err(InventoryError::Server {
                status: code.as_u16(),
            });
        }

        let body = response.text().await?;
        let items: Vec<Item> = serde_json::from_str(&body)?;

        debug!(count = items.len(), "Fetched inventory items");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn change_status(&self, sku: &str, status: bool) -> InventoryResult<()> {
        let response = self
            .client
            .put(self.change_status_url(sku))
            .json(&ChangeStatus { status })
            .send()
            .await?;

        let code = response.status();
        if !code.is_success() {
            warn!(status = %code, sku = %sku, "Change-status returned non-success status");
            return Err(InventoryError::RestoreFailed {
                sku: sku.to_string(),
                status: code.as_u16(),
            });
        }

        debug!(sku = %sku, status, "Changed item status");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let repo =
            HttpInventoryRepository::new(InventoryApiConfig::new("http://inv.local/")).unwrap();

        assert_eq!(repo.list_url(), "http://inv.local/v1/inventory");
        assert_eq!(
            repo.change_status_url("X123"),
            "http://inv.local/v1/inventory/sku/X123/change-status"
        );
    }

    #[test]
    fn test_sku_is_percent_encoded() {
        let repo =
            HttpInventoryRepository::new(InventoryApiConfig::new("http://inv.local")).unwrap();

        assert_eq!(
            repo.change_status_url("RING 7/B"),
            "http://inv.local/v1/inventory/sku/RING%207%2FB/change-status"
        );
    }
}
