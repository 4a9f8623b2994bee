//! Inventory Domain: deleted products
//!
//! Browses soft-deleted inventory records held by the remote inventory
//! service and restores them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Browser   │  ← state, view commands, restore flow
//! └──────┬──────┘
//!        │            ┌──────────┐
//!        ├───────────►│   View   │  ← pure filter + sort
//!        │            └──────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← remote access (trait + HTTP / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Item, Category, SortOption, rows
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::InventoryApiConfig;
//! use domain_inventory::{DeletedItemsBrowser, HttpInventoryRepository, SortOption};
//!
//! # async fn example() -> domain_inventory::InventoryResult<()> {
//! let repository = HttpInventoryRepository::new(InventoryApiConfig::default())?;
//! let browser = DeletedItemsBrowser::new(repository);
//!
//! browser.on_mount().await;
//! browser.set_search_term("ring").await;
//! browser.set_sort_option(SortOption::LowestPrice).await;
//!
//! for row in browser.rows() {
//!     println!("{} {} {}", row.sku, row.name, row.price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod error;
pub mod http;
pub mod models;
pub mod repository;
pub mod view;

// Re-export commonly used types
pub use browser::DeletedItemsBrowser;
pub use error::{InventoryError, InventoryResult};
pub use http::HttpInventoryRepository;
pub use models::{
    CLEAR_CATEGORY_LABEL, Category, ChangeStatus, Item, ItemRow, PLACEHOLDER_IMAGE_URL,
    RestorePhase, SortOption, ViewQuery,
};
pub use repository::{InMemoryInventoryRepository, InventoryRepository};
pub use view::{derive_view, filter_items, sort_items};
