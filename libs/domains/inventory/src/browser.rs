//! Deleted Items Browser - the controller behind the deleted-products page
//!
//! Owns the item snapshot and the view selections, and republishes the derived
//! view after every change. The snapshot is only ever replaced by a full load;
//! restoring an item goes through the remote service and a reload.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    Category, Item, ItemRow, PLACEHOLDER_IMAGE_URL, RestorePhase, SortOption, ViewQuery,
};
use crate::repository::InventoryRepository;
use crate::view::derive_view;

/// Status flag of records the browser lists
const DELETED: bool = false;

#[derive(Debug, Default)]
struct BrowserState {
    items: Vec<Item>,
    query: ViewQuery,
    /// In-flight restores per SKU, oldest first
    restores: HashMap<String, Vec<PendingRestore>>,
    next_restore_id: u64,
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingRestore {
    id: u64,
    phase: RestorePhase,
}

/// Controller for browsing and restoring soft-deleted products
pub struct DeletedItemsBrowser<R: InventoryRepository> {
    repository: Arc<R>,
    state: Arc<RwLock<BrowserState>>,
    view_tx: Arc<watch::Sender<Vec<Item>>>,
    placeholder_image: Arc<str>,
}

impl<R: InventoryRepository> DeletedItemsBrowser<R> {
    /// Create a browser with an empty snapshot. Call [`Self::on_mount`] to load.
    pub fn new(repository: R) -> Self {
        let (view_tx, _) = watch::channel(Vec::new());
        Self {
            repository: Arc::new(repository),
            state: Arc::new(RwLock::new(BrowserState::default())),
            view_tx: Arc::new(view_tx),
            placeholder_image: Arc::from(PLACEHOLDER_IMAGE_URL),
        }
    }

    /// Replace the thumbnail applied to every loaded item
    pub fn with_placeholder_image(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.placeholder_image = Arc::from(url);
        self
    }

    // =========================================================================
    // Loader
    // =========================================================================

    /// Fetch the deleted set and normalize thumbnails. Does not touch state.
    #[instrument(skip(self))]
    pub async fn load(&self) -> InventoryResult<Vec<Item>> {
        let mut items = self.repository.list_by_status(DELETED).await?;
        for item in &mut items {
            item.apply_placeholder_image(&self.placeholder_image);
        }
        Ok(items)
    }

    /// Load and replace the snapshot.
    ///
    /// On failure the error is logged and the previous snapshot stays visible.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> InventoryResult<()> {
        match self.load().await {
            Ok(items) => {
                self.replace_items(items).await;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to load deleted items, keeping last snapshot");
                Err(err)
            }
        }
    }

    /// Initial load. Errors are logged only.
    pub async fn on_mount(&self) {
        let _ = self.reload().await;
    }

    async fn replace_items(&self, items: Vec<Item>) {
        let mut state = self.state.write().await;
        if state.closed {
            debug!(count = items.len(), "Browser closed, discarding loaded items");
            return;
        }
        info!(count = items.len(), "Loaded deleted items");
        state.items = items;
        self.publish(&state);
    }

    // =========================================================================
    // Restorer
    // =========================================================================

    /// Mark `item` active on the service, then reload.
    ///
    /// The row stays in the view until the reload completes. A failed reload
    /// after a successful status change is logged and does not fail the call.
    #[instrument(skip(self, item), fields(sku = %item.sku))]
    pub async fn restore(&self, item: &Item) -> InventoryResult<()> {
        let sku = item.sku.as_str();
        let restore_id = self.begin_restore(sku).await;

        if let Err(err) = self.repository.change_status(sku, true).await {
            error!(error = %err, "Failed to restore product");
            self.finish_restore(sku, restore_id).await;
            return Err(err);
        }

        info!("Restored product");
        self.set_phase(sku, restore_id, RestorePhase::Reloading).await;
        let _ = self.reload().await;
        self.finish_restore(sku, restore_id).await;
        Ok(())
    }

    /// Restore click handler: never propagates, returns the outcome.
    pub async fn on_restore(&self, item: &Item) -> RestorePhase {
        match self.restore(item).await {
            Ok(()) => RestorePhase::Succeeded,
            Err(_) => RestorePhase::Failed,
        }
    }

    /// Restore the snapshot item with `sku`
    pub async fn restore_by_sku(&self, sku: &str) -> InventoryResult<()> {
        let item = self
            .state
            .read()
            .await
            .items
            .iter()
            .find(|i| i.sku == sku)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(sku.to_string()))?;

        self.restore(&item).await
    }

    async fn begin_restore(&self, sku: &str) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_restore_id;
        state.next_restore_id += 1;
        state
            .restores
            .entry(sku.to_string())
            .or_default()
            .push(PendingRestore {
                id,
                phase: RestorePhase::Requesting,
            });
        id
    }

    async fn set_phase(&self, sku: &str, restore_id: u64, phase: RestorePhase) {
        let mut state = self.state.write().await;
        if let Some(pending) = state
            .restores
            .get_mut(sku)
            .and_then(|list| list.iter_mut().find(|r| r.id == restore_id))
        {
            pending.phase = phase;
        }
    }

    async fn finish_restore(&self, sku: &str, restore_id: u64) {
        let mut state = self.state.write().await;
        if let Some(list) = state.restores.get_mut(sku) {
            list.retain(|r| r.id != restore_id);
            if list.is_empty() {
                state.restores.remove(sku);
            }
        }
    }

    // =========================================================================
    // View commands
    // =========================================================================

    pub async fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.update_query(|query| query.search_term = term).await;
    }

    pub async fn set_category(&self, category: Option<Category>) {
        self.update_query(|query| query.category = category).await;
    }

    /// Apply a filter label; `clear` unsets the category.
    pub async fn select_category(&self, label: &str) -> Result<Option<Category>, strum::ParseError> {
        let category = Category::from_selection(label)?;
        self.set_category(category).await;
        Ok(category)
    }

    /// Unset the category. The search term is left as is.
    pub async fn clear_category(&self) {
        self.set_category(None).await;
    }

    pub async fn set_sort_option(&self, sort: SortOption) {
        self.update_query(|query| query.sort = sort).await;
    }

    /// Apply a sort label; unknown labels keep the filtered order.
    pub async fn select_sort(&self, label: &str) -> SortOption {
        let sort = SortOption::from_label(label);
        self.set_sort_option(sort).await;
        sort
    }

    async fn update_query(&self, apply: impl FnOnce(&mut ViewQuery)) {
        let mut state = self.state.write().await;
        if state.closed {
            debug!("Browser closed, ignoring view command");
            return;
        }
        apply(&mut state.query);
        debug!(query = ?state.query, "View query changed");
        self.publish(&state);
    }

    /// Unmount: drop the snapshot and ignore anything that arrives later.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.closed = true;
        state.items.clear();
        state.restores.clear();
        self.publish(&state);
    }

    fn publish(&self, state: &BrowserState) {
        self.view_tx
            .send_replace(derive_view(&state.items, &state.query));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Last loaded snapshot, unfiltered
    pub async fn items(&self) -> Vec<Item> {
        self.state.read().await.items.clone()
    }

    pub async fn query(&self) -> ViewQuery {
        self.state.read().await.query.clone()
    }

    /// Derived view: filtered, then sorted
    pub fn view(&self) -> Vec<Item> {
        self.view_tx.borrow().clone()
    }

    pub fn rows(&self) -> Vec<ItemRow> {
        self.view_tx.borrow().iter().map(ItemRow::from).collect()
    }

    /// Phase of the latest in-flight restore of `sku`, `Idle` when none
    pub async fn restore_phase(&self, sku: &str) -> RestorePhase {
        self.state
            .read()
            .await
            .restores
            .get(sku)
            .and_then(|list| list.last())
            .map(|r| r.phase)
            .unwrap_or_default()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }

    /// Receiver that always holds the latest derived view
    pub fn subscribe(&self) -> watch::Receiver<Vec<Item>> {
        self.view_tx.subscribe()
    }
}

impl<R: InventoryRepository> Clone for DeletedItemsBrowser<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            state: Arc::clone(&self.state),
            view_tx: Arc::clone(&self.view_tx),
            placeholder_image: Arc::clone(&self.placeholder_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryInventoryRepository, MockInventoryRepository};
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Repository that parks each gated call until the test releases it
    struct GatedRepository {
        inner: InMemoryInventoryRepository,
        gate_lists: Arc<AtomicBool>,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GatedRepository {
        async fn wait_for_release(&self) {
            let released = self.release.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            self.entered.notify_one();
            released.await;
        }
    }

    #[async_trait]
    impl InventoryRepository for GatedRepository {
        async fn list_by_status(&self, status: bool) -> InventoryResult<Vec<Item>> {
            if self.gate_lists.load(Ordering::SeqCst) {
                self.wait_for_release().await;
            }
            self.inner.list_by_status(status).await
        }

        async fn change_status(&self, sku: &str, status: bool) -> InventoryResult<()> {
            self.wait_for_release().await;
            self.inner.change_status(sku, status).await
        }
    }

    struct Gates {
        gate_lists: Arc<AtomicBool>,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    async fn gated_browser() -> (DeletedItemsBrowser<GatedRepository>, Gates) {
        let gates = Gates {
            gate_lists: Arc::new(AtomicBool::new(false)),
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        let repository = GatedRepository {
            inner: InMemoryInventoryRepository::with_items(remote_items()),
            gate_lists: Arc::clone(&gates.gate_lists),
            entered: Arc::clone(&gates.entered),
            release: Arc::clone(&gates.release),
        };

        let browser = DeletedItemsBrowser::new(repository);
        browser.on_mount().await;
        (browser, gates)
    }

    fn item(sku: &str, name: &str, price: f64, category: &str) -> Item {
        Item {
            id: format!("id-{sku}"),
            sku: sku.to_string(),
            name: name.to_string(),
            category: Some(category.to_string()),
            price,
            images: vec![format!("https://img.example/{sku}.png")],
            status: false,
        }
    }

    fn remote_items() -> Vec<Item> {
        vec![
            item("X123", "Ring A", 50.0, "Jewelry"),
            item("G456", "Stone B", 20.0, "Gemstones"),
        ]
    }

    fn names(items: &[Item]) -> Vec<String> {
        items.iter().map(|i| i.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_mount_loads_deleted_items_with_placeholder() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .with(mockall::predicate::eq(false))
            .times(1)
            .returning(|_| Ok(remote_items()));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        let items = browser.items().await;
        assert_eq!(items.len(), 2);
        assert!(
            items
                .iter()
                .all(|i| i.thumbnail() == Some(PLACEHOLDER_IMAGE_URL))
        );
        // Default sort is A to Z
        assert_eq!(names(&browser.view()), vec!["Ring A", "Stone B"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_last_snapshot() {
        let mut mock_repo = MockInventoryRepository::new();
        let mut seq = Sequence::new();
        mock_repo
            .expect_list_by_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(remote_items()));
        mock_repo
            .expect_list_by_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(InventoryError::Network("connection reset".to_string())));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        let result = browser.reload().await;
        assert!(matches!(result, Err(InventoryError::Network(_))));
        assert_eq!(browser.items().await.len(), 2);
        assert_eq!(browser.view().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_server_error_leaves_snapshot_unchanged() {
        let mut mock_repo = MockInventoryRepository::new();
        // Only the mount load: no reload after a failed restore
        mock_repo
            .expect_list_by_status()
            .times(1)
            .returning(|_| Ok(remote_items()));
        mock_repo
            .expect_change_status()
            .withf(|sku, status| sku == "X123" && *status)
            .times(1)
            .returning(|sku, _| {
                Err(InventoryError::RestoreFailed {
                    sku: sku.to_string(),
                    status: 500,
                })
            });

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;
        let before = browser.items().await;

        let target = before[0].clone();
        let outcome = browser.on_restore(&target).await;

        assert_eq!(outcome, RestorePhase::Failed);
        assert_eq!(browser.items().await, before);
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Idle);
    }

    #[tokio::test]
    async fn test_restore_success_reloads_snapshot() {
        let mut mock_repo = MockInventoryRepository::new();
        let mut seq = Sequence::new();
        mock_repo
            .expect_list_by_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(remote_items()));
        mock_repo
            .expect_change_status()
            .withf(|sku, status| sku == "X123" && *status)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock_repo
            .expect_list_by_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![item("G456", "Stone B", 20.0, "Gemstones")]));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        browser.restore_by_sku("X123").await.unwrap();

        assert_eq!(names(&browser.view()), vec!["Stone B"]);
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Idle);
    }

    #[tokio::test]
    async fn test_restore_phases_while_in_flight() {
        let (browser, gates) = gated_browser().await;
        gates.gate_lists.store(true, Ordering::SeqCst);
        let ring = browser.items().await[0].clone();

        let restoring = tokio::spawn({
            let browser = browser.clone();
            async move { browser.on_restore(&ring).await }
        });

        // Status change in flight
        gates.entered.notified().await;
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Requesting);
        assert!(names(&browser.view()).contains(&"Ring A".to_string()));

        // Reload in flight: the row is still shown
        gates.release.notify_one();
        gates.entered.notified().await;
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Reloading);
        assert!(names(&browser.view()).contains(&"Ring A".to_string()));

        gates.release.notify_one();
        assert_eq!(restoring.await.unwrap(), RestorePhase::Succeeded);
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Idle);
        assert_eq!(names(&browser.view()), vec!["Stone B"]);
    }

    #[tokio::test]
    async fn test_overlapping_restores_of_one_sku_track_each_request() {
        let (browser, gates) = gated_browser().await;
        let ring = browser.items().await[0].clone();

        let first = tokio::spawn({
            let browser = browser.clone();
            let ring = ring.clone();
            async move { browser.on_restore(&ring).await }
        });
        gates.entered.notified().await;

        let second = tokio::spawn({
            let browser = browser.clone();
            async move { browser.on_restore(&ring).await }
        });
        gates.entered.notified().await;

        // Waiters are released oldest first
        gates.release.notify_one();
        assert_eq!(first.await.unwrap(), RestorePhase::Succeeded);
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Requesting);

        gates.release.notify_one();
        assert_eq!(second.await.unwrap(), RestorePhase::Succeeded);
        assert_eq!(browser.restore_phase("X123").await, RestorePhase::Idle);
    }

    #[tokio::test]
    async fn test_restore_by_unknown_sku() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));
        mock_repo.expect_change_status().never();

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        let result = browser.restore_by_sku("NOPE").await;
        assert!(matches!(result, Err(InventoryError::NotFound(sku)) if sku == "NOPE"));
    }

    #[tokio::test]
    async fn test_view_commands_recompute_view() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        browser.set_search_term("ring").await;
        assert_eq!(names(&browser.view()), vec!["Ring A"]);

        browser.set_search_term("").await;
        assert_eq!(browser.select_sort("Lowest Price").await, SortOption::LowestPrice);
        assert_eq!(names(&browser.view()), vec!["Stone B", "Ring A"]);

        assert_eq!(browser.select_sort("Popularity").await, SortOption::Unordered);
        assert_eq!(names(&browser.view()), vec!["Ring A", "Stone B"]);
    }

    #[tokio::test]
    async fn test_clear_category_keeps_search_term() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.on_mount().await;

        browser.set_search_term("b").await;
        browser.select_category("Gemstones").await.unwrap();
        assert_eq!(names(&browser.view()), vec!["Stone B"]);

        browser.select_category("clear").await.unwrap();
        assert_eq!(browser.query().await.category, None);
        assert_eq!(browser.query().await.search_term, "b");
        assert_eq!(names(&browser.view()), vec!["Stone B"]);

        browser.set_search_term("").await;
        assert_eq!(browser.view().len(), 2);
    }

    #[tokio::test]
    async fn test_select_unknown_category_is_rejected() {
        let browser = DeletedItemsBrowser::new(MockInventoryRepository::new());
        assert!(browser.select_category("Watches").await.is_err());
        assert_eq!(browser.query().await.category, None);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_recompute() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));

        let browser = DeletedItemsBrowser::new(mock_repo);
        let mut rx = browser.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        browser.on_mount().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 2);

        browser.set_sort_option(SortOption::ZToA).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(names(&rx.borrow_and_update()), vec!["Stone B", "Ring A"]);
    }

    #[tokio::test]
    async fn test_close_discards_late_load() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));

        let browser = DeletedItemsBrowser::new(mock_repo);
        browser.close().await;
        browser.on_mount().await;

        assert!(browser.is_closed().await);
        assert!(browser.items().await.is_empty());
        assert!(browser.view().is_empty());

        browser.set_search_term("ring").await;
        assert_eq!(browser.query().await.search_term, "");
    }

    #[tokio::test]
    async fn test_rows_expose_table_contract() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_by_status()
            .returning(|_| Ok(remote_items()));

        let browser =
            DeletedItemsBrowser::new(mock_repo).with_placeholder_image("https://cdn.example/p.png");
        browser.on_mount().await;

        let rows = browser.rows();
        assert_eq!(rows[0].id, "id-X123");
        assert_eq!(rows[0].sku, "X123");
        assert_eq!(rows[0].category.as_deref(), Some("Jewelry"));
        assert_eq!(rows[0].price, 50.0);
        assert_eq!(rows[0].thumbnail.as_deref(), Some("https://cdn.example/p.png"));
    }
}
