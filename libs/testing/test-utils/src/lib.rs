//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `FakeInventoryService`: in-process HTTP stand-in for the inventory service
//! - `TestDataBuilder`: deterministic inventory records (always available)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{FakeInventoryService, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_inventory_test() {
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!     let service = FakeInventoryService::start(vec![
//!         builder.deleted_item("ring", "Ring A", Some("Jewelry"), 50.0),
//!     ])
//!     .await;
//!
//!     let base_url = service.base_url();
//! }
//! ```

mod inventory;

pub use inventory::{FakeInventoryService, ListMode, RecordedRequest};

use serde_json::{Value, json};

/// Builder for test data with deterministic identifiers
///
/// This ensures tests are reproducible: the same test name always yields the
/// same ids and SKUs.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_restore_item");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Record id for `suffix`, shaped like a 24-character document id
    pub fn id(&self, suffix: &str) -> String {
        format!("{:016x}{:08x}", self.seed, fnv(suffix))
    }

    /// SKU for `suffix`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.sku("ring"), "SKU-7-RING");
    /// ```
    pub fn sku(&self, suffix: &str) -> String {
        format!("SKU-{}-{}", self.seed, suffix.to_uppercase())
    }

    /// Backend-shaped JSON for a soft-deleted item
    pub fn deleted_item(
        &self,
        suffix: &str,
        name: &str,
        category: Option<&str>,
        price: f64,
    ) -> Value {
        json!({
            "_id": self.id(suffix),
            "sku": self.sku(suffix),
            "name": name,
            "category": category,
            "price": price,
            "images": [format!("https://images.test/{suffix}/1.png")],
            "status": false,
        })
    }

    /// Backend-shaped JSON for an active item
    pub fn active_item(&self, suffix: &str, name: &str, price: f64) -> Value {
        let mut item = self.deleted_item(suffix, name, None, price);
        item["status"] = Value::Bool(true);
        item
    }
}

fn fnv(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
