use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{InventoryError, InventoryResult};
use crate::models::Item;

/// Access to the remote inventory service
///
/// The service owns the records; implementations only read the list scoped by
/// status and issue status changes keyed by SKU.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// List every item whose status flag equals `status`
    async fn list_by_status(&self, status: bool) -> InventoryResult<Vec<Item>>;

    /// Set the status flag of the item identified by `sku`
    async fn change_status(&self, sku: &str, status: bool) -> InventoryResult<()>;
}

/// In-memory implementation of InventoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryInventoryRepository {
    items: Arc<RwLock<Vec<Item>>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Current records, including restored ones
    pub async fn snapshot(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn list_by_status(&self, status: bool) -> InventoryResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|i| i.status == status).cloned().collect())
    }

    async fn change_status(&self, sku: &str, status: bool) -> InventoryResult<()> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.sku == sku)
            .ok_or_else(|| InventoryError::NotFound(sku.to_string()))?;

        item.status = status;
        tracing::info!(sku = %sku, status, "Changed item status");
        Ok(())
    }
}
