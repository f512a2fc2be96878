//! News Board facade
//!
//! Wires the store adapter, job trigger, collection, coordinator and
//! listener into one object the presentation layer drives.

use crate::collection::ItemCollection;
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::listener::{ListenerHandle, ListenerStats, ReconciliationListener};
use crate::notice::{Notice, Notices};
use crate::transition::{TransitionCoordinator, TransitionOutcome};
use newsboard_core::{
    apply_optimistic_in, items_in_stage, stage_counts, Category, ChangeEvent, ContentItem,
    ItemId, PriorityRating, WorkflowStage,
};
use newsboard_store::{ContentStore, PersistOutcome, StoreAdapter, StoreError};
use newsboard_trigger::{JobAck, JobTrigger};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// One board column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub stage: WorkflowStage,
    pub items: Vec<ContentItem>,
}

impl Column {
    /// Column heading
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.stage.title()
    }

    /// Number of cards
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Editorial workflow board
pub struct NewsBoard {
    store: StoreAdapter,
    trigger: Arc<dyn JobTrigger>,
    collection: Arc<ItemCollection>,
    coordinator: TransitionCoordinator,
    notices: Notices,
    categories: Mutex<Vec<Category>>,
    listener: tokio::sync::Mutex<Option<ListenerHandle>>,
}

impl NewsBoard {
    /// Create board over a store and job trigger
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        trigger: Arc<dyn JobTrigger>,
        config: &BoardConfig,
    ) -> Self {
        let store = StoreAdapter::new(store);
        let collection = Arc::new(ItemCollection::new(config.defer_pending_updates));
        let notices = Notices::new();
        let coordinator = TransitionCoordinator::new(
            store.clone(),
            Arc::clone(&trigger),
            Arc::clone(&collection),
            notices.clone(),
        )
        .with_success_flag_ttl(config.success_flag_ttl());

        Self {
            store,
            trigger,
            collection,
            coordinator,
            notices,
            categories: Mutex::new(Vec::new()),
            listener: tokio::sync::Mutex::new(None),
        }
    }

    /// Open the change feed, then load items and categories
    ///
    /// # Errors
    /// The feed could not be opened or the initial load failed
    pub async fn open(&self) -> Result<usize, BoardError> {
        self.start_listening().await?;
        let count = self.load().await?;
        if let Err(e) = self.load_categories().await {
            tracing::warn!(error = %e, "categories unavailable");
        }
        Ok(count)
    }

    /// Load every item into the board
    ///
    /// On failure the board is left empty and a notice is sent.
    ///
    /// # Errors
    /// Any store read failure
    pub async fn load(&self) -> Result<usize, BoardError> {
        match self.store.fetch_all().await {
            Ok(items) => {
                let count = items.len();
                let counts = stage_counts(&items);
                self.collection.replace_all(items);
                tracing::info!(count, ?counts, "board loaded");
                Ok(count)
            }
            Err(source) => {
                self.collection.clear();
                let error = BoardError::StoreRead(source);
                tracing::warn!(error = %error, retryable = error.is_retryable(), "board load failed");
                self.notices.send(Notice::from_error(&error));
                Err(error)
            }
        }
    }

    /// Load category reference data
    ///
    /// # Errors
    /// Any store read failure
    pub async fn load_categories(&self) -> Result<Vec<Category>, BoardError> {
        let categories = self
            .store
            .fetch_categories()
            .await
            .map_err(BoardError::StoreRead)?;
        self.categories.lock().clone_from(&categories);
        Ok(categories)
    }

    /// Start reconciling live changes
    ///
    /// A running listener is left as is.
    ///
    /// # Errors
    /// The change feed could not be opened
    pub async fn start_listening(&self) -> Result<(), BoardError> {
        let mut listener = self.listener.lock().await;
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Ok(());
        }
        let feed = self.store.subscribe().await.map_err(BoardError::Subscribe)?;
        *listener = Some(ReconciliationListener::spawn(
            feed,
            Arc::clone(&self.collection),
        ));
        Ok(())
    }

    /// Stop the listener
    pub async fn shutdown(&self) -> Option<ListenerStats> {
        let handle = self.listener.lock().await.take()?;
        Some(handle.shutdown().await)
    }

    /// Current items
    #[must_use]
    pub fn items(&self) -> Arc<Vec<ContentItem>> {
        self.collection.snapshot()
    }

    /// Item by id
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<ContentItem> {
        self.collection.get(id)
    }

    /// Watch for collection changes
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<Vec<ContentItem>>> {
        self.collection.subscribe()
    }

    /// Subscribe to user-facing notices
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Loaded categories
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.categories.lock().clone()
    }

    /// Drag-and-drop coordinator
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &TransitionCoordinator {
        &self.coordinator
    }

    /// Items grouped into the four stage columns
    #[must_use]
    pub fn columns(&self) -> Vec<Column> {
        group_columns(&self.collection.snapshot())
    }

    /// Columns as they would look after moving an item, without changing
    /// the board or the store
    ///
    /// # Errors
    /// `ItemNotFound` if the item is not on the board
    pub fn preview_move(
        &self,
        id: &ItemId,
        stage: WorkflowStage,
    ) -> Result<Vec<Column>, BoardError> {
        self.require(id)?;
        let items = self.collection.snapshot();
        Ok(group_columns(&apply_optimistic_in(&items, id, stage)))
    }

    /// Move an item to a stage
    ///
    /// # Errors
    /// See [`TransitionCoordinator::move_item`]
    pub async fn move_item(
        &self,
        id: &ItemId,
        stage: WorkflowStage,
    ) -> Result<TransitionOutcome, BoardError> {
        self.coordinator.move_item(id, stage).await
    }

    /// Publish an item from the document view
    ///
    /// # Errors
    /// Unknown item or store failure
    pub async fn publish(&self, id: &ItemId) -> Result<PersistOutcome, BoardError> {
        let item = self.require(id)?;
        self.store
            .publish(&item)
            .await
            .map_err(|source| self.persist_failed(id, source))
    }

    /// Withdraw an item to the draft column from the document view
    ///
    /// # Errors
    /// Unknown item or store failure
    pub async fn unpublish(&self, id: &ItemId) -> Result<PersistOutcome, BoardError> {
        let item = self.require(id)?;
        self.store
            .unpublish(&item)
            .await
            .map_err(|source| self.persist_failed(id, source))
    }

    /// Replace an item's categories
    ///
    /// # Errors
    /// Unknown item or store failure
    pub async fn set_categories(
        &self,
        id: &ItemId,
        categories: Vec<Category>,
    ) -> Result<ContentItem, BoardError> {
        self.require(id)?;
        let record = self
            .store
            .set_categories(id, categories)
            .await
            .map_err(|source| self.persist_failed(id, source))?;
        self.collection.apply_event(ChangeEvent::update(record.clone()));
        Ok(record)
    }

    /// Set an item's priority rating
    ///
    /// # Errors
    /// Unknown item or store failure
    pub async fn set_priority_rating(
        &self,
        id: &ItemId,
        rating: PriorityRating,
    ) -> Result<ContentItem, BoardError> {
        self.require(id)?;
        let record = self
            .store
            .set_priority_rating(id, rating)
            .await
            .map_err(|source| self.persist_failed(id, source))?;
        self.collection.apply_event(ChangeEvent::update(record.clone()));
        Ok(record)
    }

    /// Start an editorial planning run
    ///
    /// # Errors
    /// Any trigger failure; a notice is sent as well
    pub async fn trigger_planning(&self) -> Result<JobAck, BoardError> {
        match self.trigger.trigger_planning().await {
            Ok(ack) => {
                let message = ack
                    .message
                    .clone()
                    .unwrap_or_else(|| "Planning started".to_string());
                self.notices.send(Notice::info(message));
                Ok(ack)
            }
            Err(source) => {
                let error = BoardError::Trigger {
                    item_id: None,
                    source,
                };
                self.notices.send(Notice::from_error(&error));
                Err(error)
            }
        }
    }

    fn require(&self, id: &ItemId) -> Result<ContentItem, BoardError> {
        self.collection
            .get(id)
            .ok_or_else(|| BoardError::ItemNotFound(id.clone()))
    }

    fn persist_failed(&self, id: &ItemId, source: StoreError) -> BoardError {
        let error = BoardError::StorePersist {
            item_id: id.clone(),
            source,
        };
        self.notices.send(Notice::from_error(&error));
        error
    }
}

fn group_columns(items: &[ContentItem]) -> Vec<Column> {
    WorkflowStage::ALL
        .into_iter()
        .map(|stage| Column {
            stage,
            items: items_in_stage(items, stage).into_iter().cloned().collect(),
        })
        .collect()
}

impl std::fmt::Debug for NewsBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsBoard")
            .field("store", &self.store)
            .field("items", &self.collection.len())
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
