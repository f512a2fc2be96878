//! Transition coordinator
//!
//! Owns the drag gesture lifecycle and the commit of one stage change:
//!
//! ```text
//! Idle --drag_start--> Pending --drop_on(None)--------------> Idle (cancelled)
//!                         |----drop_on(same stage)---------> Idle (unchanged)
//!                         `----drop_on(new stage)--> Committing --ok/err--> Idle
//! ```
//!
//! A commit works from the item as the board shows it at drop time, so
//! edits that arrived while the card was being dragged are kept. It applies
//! the optimistic move first, then persists through the store adapter, then
//! (draft patch to writing only) triggers the writing job. Any failure on
//! that path restores the item as it was before the move and raises a
//! notice. While a commit runs, live events for the item are held back by
//! the collection and replayed once it settles.

use crate::collection::ItemCollection;
use crate::error::BoardError;
use crate::notice::{Notice, Notices};
use newsboard_core::{apply_optimistic, derive_stage, ContentItem, ItemId, WorkflowStage};
use newsboard_store::{PersistOutcome, PersistPath, StoreAdapter};
use newsboard_trigger::{JobAck, JobTrigger};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Drag gesture captured at drag start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub item_id: ItemId,
    pub original_stage: WorkflowStage,
    /// Item as shown when the drag started
    pub snapshot: ContentItem,
}

/// Gesture state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    Pending(PendingTransition),
    Committing {
        item_id: ItemId,
        target: WorkflowStage,
    },
}

/// How a drop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Dropped outside any column
    Cancelled,
    /// Dropped on the column it came from
    Unchanged,
    /// Persisted to the target stage
    Committed {
        item_id: ItemId,
        stage: WorkflowStage,
        path: PersistPath,
        /// Writing job acknowledgement, when one was triggered
        job: Option<JobAck>,
        /// Old variant a failed delete left behind
        lingering: Option<ItemId>,
    },
}

impl TransitionOutcome {
    /// Check if the item changed stage
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, TransitionOutcome::Committed { .. })
    }
}

/// Drag-and-drop stage transitions with optimistic update and rollback
pub struct TransitionCoordinator {
    store: StoreAdapter,
    trigger: Arc<dyn JobTrigger>,
    collection: Arc<ItemCollection>,
    notices: Notices,
    gesture: Mutex<GestureState>,
    success_flag_ttl: Duration,
}

impl TransitionCoordinator {
    /// Create coordinator
    #[must_use]
    pub fn new(
        store: StoreAdapter,
        trigger: Arc<dyn JobTrigger>,
        collection: Arc<ItemCollection>,
        notices: Notices,
    ) -> Self {
        Self {
            store,
            trigger,
            collection,
            notices,
            gesture: Mutex::new(GestureState::Idle),
            success_flag_ttl: Duration::from_millis(crate::config::DEFAULT_SUCCESS_FLAG_MS),
        }
    }

    /// With success flag lifetime
    #[inline]
    #[must_use]
    pub fn with_success_flag_ttl(mut self, ttl: Duration) -> Self {
        self.success_flag_ttl = ttl;
        self
    }

    /// Current gesture state
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture.lock().clone()
    }

    /// Begin dragging an item
    ///
    /// # Errors
    /// - `GestureInProgress` if another drag or commit is active
    /// - `ItemNotFound` if the item is not on the board
    pub fn drag_start(&self, item_id: &ItemId) -> Result<PendingTransition, BoardError> {
        let mut gesture = self.gesture.lock();
        if *gesture != GestureState::Idle {
            return Err(BoardError::GestureInProgress);
        }

        let snapshot = self
            .collection
            .get(item_id)
            .ok_or_else(|| BoardError::ItemNotFound(item_id.clone()))?;
        let pending = PendingTransition {
            item_id: item_id.clone(),
            original_stage: derive_stage(&snapshot),
            snapshot,
        };

        tracing::debug!(item_id = %item_id, stage = %pending.original_stage, "drag started");
        *gesture = GestureState::Pending(pending.clone());
        Ok(pending)
    }

    /// Abandon the current drag without changes
    pub fn drag_cancel(&self) {
        let mut gesture = self.gesture.lock();
        if matches!(*gesture, GestureState::Pending(_)) {
            *gesture = GestureState::Idle;
        }
    }

    /// End the drag over a column, or outside any column with `None`
    ///
    /// # Errors
    /// - `NoPendingTransition` without a preceding [`Self::drag_start`]
    /// - `StorePersist` or `Trigger` when the commit failed; the board has
    ///   been rolled back and a notice sent
    pub async fn drop_on(
        &self,
        target: Option<WorkflowStage>,
    ) -> Result<TransitionOutcome, BoardError> {
        let (pending, target) = {
            let mut gesture = self.gesture.lock();
            let GestureState::Pending(pending) = gesture.clone() else {
                return Err(BoardError::NoPendingTransition);
            };

            match target {
                None => {
                    *gesture = GestureState::Idle;
                    tracing::debug!(item_id = %pending.item_id, "drop outside columns, cancelled");
                    return Ok(TransitionOutcome::Cancelled);
                }
                Some(stage) if stage == pending.original_stage => {
                    *gesture = GestureState::Idle;
                    return Ok(TransitionOutcome::Unchanged);
                }
                Some(stage) => {
                    *gesture = GestureState::Committing {
                        item_id: pending.item_id.clone(),
                        target: stage,
                    };
                    (pending, stage)
                }
            }
        };

        self.commit(pending, target).await
    }

    /// Drag and drop in one call
    ///
    /// # Errors
    /// See [`Self::drag_start`] and [`Self::drop_on`]
    pub async fn move_item(
        &self,
        item_id: &ItemId,
        target: WorkflowStage,
    ) -> Result<TransitionOutcome, BoardError> {
        self.drag_start(item_id)?;
        self.drop_on(Some(target)).await
    }

    async fn commit(
        &self,
        pending: PendingTransition,
        target: WorkflowStage,
    ) -> Result<TransitionOutcome, BoardError> {
        let mut guard = CommitGuard::new(self, pending.item_id.clone());
        let item_id = pending.item_id.clone();

        // Deferral starts before the read so no event slips in between.
        self.collection.begin_transition(&item_id);
        let Some(base) = self.collection.get(&item_id) else {
            return Err(BoardError::ItemNotFound(item_id));
        };
        self.collection
            .update_item(&item_id, |item| apply_optimistic(item, target));
        tracing::info!(
            item_id = %item_id,
            from = %pending.original_stage,
            to = %target,
            "moving item"
        );

        let outcome = match self.store.persist_stage_change(&base, target).await {
            Ok(outcome) => outcome,
            Err(source) => {
                let error = BoardError::StorePersist {
                    item_id: item_id.clone(),
                    source,
                };
                tracing::error!(
                    item_id = %item_id,
                    stage = %target,
                    retryable = error.is_retryable(),
                    error = %error,
                    "persist failed"
                );
                self.roll_back(&base);
                guard.settle();
                self.notices.send(Notice::from_error(&error));
                return Err(error);
            }
        };
        self.report_lingering(&outcome);

        let job = if target == WorkflowStage::Writing && outcome.path == PersistPath::DraftPatch {
            match self.trigger.trigger_writing(&item_id).await {
                Ok(ack) => Some(ack),
                Err(source) => {
                    tracing::error!(
                        item_id = %item_id,
                        retryable = source.is_retryable(),
                        error = %source,
                        "writing job trigger failed"
                    );
                    self.compensate(&base).await;
                    let error = BoardError::Trigger {
                        item_id: Some(item_id.clone()),
                        source,
                    };
                    self.roll_back(&base);
                    guard.settle();
                    self.notices.send(Notice::from_error(&error));
                    return Err(error);
                }
            }
        } else {
            None
        };

        guard.settle();
        if job.is_some() {
            self.flag_backend_success(&outcome.record.id);
        }

        tracing::info!(item_id = %item_id, stage = %target, path = %outcome.path, "item moved");
        Ok(TransitionOutcome::Committed {
            item_id,
            stage: target,
            path: outcome.path,
            job,
            lingering: outcome.lingering,
        })
    }

    // Put back the item as it was before the move. If a newer revision
    // already landed, only the stage-specific effects are undone.
    fn roll_back(&self, base: &ContentItem) {
        let stage = derive_stage(base);
        let restored = self.collection.update_item(&base.id, |current| {
            if current.revision == base.revision {
                base.clone()
            } else {
                apply_optimistic(current, stage)
            }
        });
        tracing::info!(
            item_id = %base.id,
            stage = %stage,
            restored,
            "rolled back optimistic move"
        );
    }

    // The draft patch already landed; undo it so store and board agree.
    async fn compensate(&self, base: &ContentItem) {
        if let Err(e) = self
            .store
            .revert_draft_patch(base, derive_stage(base))
            .await
        {
            tracing::warn!(
                item_id = %base.id,
                error = %e,
                "could not revert draft patch after trigger failure"
            );
        }
    }

    fn report_lingering(&self, outcome: &PersistOutcome) {
        if let Some(old) = &outcome.lingering {
            self.notices.send(
                Notice::warning(format!(
                    "Article now exists as both draft and published; old copy {old} was not removed"
                ))
                .for_item(outcome.record.id.clone()),
            );
        }
    }

    fn flag_backend_success(&self, id: &ItemId) {
        self.collection.update_item(id, |item| {
            let mut flagged = item.clone();
            flagged.backend_succeeded = true;
            flagged
        });

        let collection = Arc::clone(&self.collection);
        let id = id.clone();
        let ttl = self.success_flag_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            collection.update_item(&id, |item| {
                let mut cleared = item.clone();
                cleared.backend_succeeded = false;
                cleared
            });
        });
    }
}

impl fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionCoordinator")
            .field("gesture", &*self.gesture.lock())
            .field("success_flag_ttl", &self.success_flag_ttl)
            .finish_non_exhaustive()
    }
}

// Returns the gesture to idle and replays deferred events, also when the
// commit future is dropped part way.
struct CommitGuard<'a> {
    coordinator: &'a TransitionCoordinator,
    item_id: ItemId,
    settled: bool,
}

impl<'a> CommitGuard<'a> {
    fn new(coordinator: &'a TransitionCoordinator, item_id: ItemId) -> Self {
        Self {
            coordinator,
            item_id,
            settled: false,
        }
    }

    fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.coordinator.collection.settle_transition(&self.item_id);
        *self.coordinator.gesture.lock() = GestureState::Idle;
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.settle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::EventDisposition;
    use async_trait::async_trait;
    use mockall::mock;
    use newsboard_core::{Category, ChangeEvent, ContentBlock, PriorityRating};
    use newsboard_store::{
        ChangeStream, ContentStore, ItemPatch, MemoryStore, StoreError, StoreOp, StoreOpKind,
    };
    use newsboard_trigger::{JobKind, TriggerError, TriggerFailure};
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    mock! {
        pub Trigger {}

        #[async_trait]
        impl JobTrigger for Trigger {
            async fn trigger_writing(&self, item_id: &ItemId) -> Result<JobAck, TriggerError>;
            async fn trigger_planning(&self) -> Result<JobAck, TriggerError>;
        }
    }

    fn ack() -> JobAck {
        JobAck {
            success: true,
            message: None,
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        collection: Arc<ItemCollection>,
        coordinator: TransitionCoordinator,
        notices: Notices,
    }

    fn fixture(items: Vec<ContentItem>, trigger: MockTrigger) -> Fixture {
        let store = Arc::new(MemoryStore::with_items(items));
        fixture_over(store.clone(), store, trigger)
    }

    // Coordinator writes go through `through`; assertions read `store`.
    fn fixture_over(
        store: Arc<MemoryStore>,
        through: Arc<dyn ContentStore>,
        trigger: MockTrigger,
    ) -> Fixture {
        let collection = Arc::new(ItemCollection::new(true));
        collection.replace_all(store.snapshot().items);
        let notices = Notices::new();
        let coordinator = TransitionCoordinator::new(
            StoreAdapter::new(through),
            Arc::new(trigger),
            Arc::clone(&collection),
            notices.clone(),
        );
        Fixture {
            store,
            collection,
            coordinator,
            notices,
        }
    }

    // Parks every patch after it lands until released.
    #[derive(Debug, Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    #[derive(Debug)]
    struct GatedStore {
        inner: Arc<MemoryStore>,
        gate: Arc<Gate>,
    }

    #[async_trait]
    impl ContentStore for GatedStore {
        async fn fetch_items(&self) -> Result<Vec<ContentItem>, StoreError> {
            self.inner.fetch_items().await
        }

        async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
            self.inner.fetch_categories().await
        }

        async fn listen(&self) -> Result<ChangeStream, StoreError> {
            self.inner.listen().await
        }

        async fn patch(&self, id: &ItemId, patch: ItemPatch) -> Result<ContentItem, StoreError> {
            let record = self.inner.patch(id, patch).await?;
            self.gate.entered.notify_one();
            self.gate.release.notified().await;
            Ok(record)
        }

        async fn create_or_replace(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
            self.inner.create_or_replace(item).await
        }

        async fn create(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
            self.inner.create(item).await
        }

        async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    fn body_text(item: &ContentItem) -> String {
        item.body.iter().map(ContentBlock::text).collect()
    }

    // Edits the stored record and feeds the resulting event to the board.
    async fn remote_edit(f: &Fixture, id: &ItemId, patch: ItemPatch) -> EventDisposition {
        let record = f.store.patch(id, patch).await.unwrap();
        f.collection.apply_event(ChangeEvent::update(record))
    }

    const OLD_COPY: &str = "OLD body text that is comfortably past the fifty character mark";
    const NEW_COPY: &str = "NEW body text that is comfortably past the fifty character mark";

    fn draft_with_copy(id: &str) -> ContentItem {
        ContentItem::new(id, "Draft")
            .with_stage(WorkflowStage::Draft)
            .with_body(vec![ContentBlock::paragraph("k1", OLD_COPY)])
            .with_revision("rev-1")
    }

    fn idea(id: &str) -> ContentItem {
        ContentItem::new(id, "Idea")
            .with_stage(WorkflowStage::Idea)
            .with_revision("rev-1")
    }

    fn no_trigger_calls() -> MockTrigger {
        let mut trigger = MockTrigger::new();
        trigger.expect_trigger_writing().never();
        trigger
    }

    #[tokio::test]
    async fn idea_to_writing_patches_and_triggers_job() {
        let mut trigger = MockTrigger::new();
        trigger
            .expect_trigger_writing()
            .withf(|id| id.as_str() == "drafts.a1")
            .times(1)
            .returning(|_| Ok(ack()));
        let f = fixture(vec![idea("drafts.a1")], trigger);
        let id = ItemId::new("drafts.a1");

        let outcome = f.coordinator.move_item(&id, WorkflowStage::Writing).await.unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Committed {
                item_id: id.clone(),
                stage: WorkflowStage::Writing,
                path: PersistPath::DraftPatch,
                job: Some(ack()),
                lingering: None,
            }
        );
        let stored = f.store.get(&id).unwrap();
        assert_eq!(stored.stage, Some(WorkflowStage::Writing));
        assert_eq!(stored.body.len(), 1);
        assert!(f.collection.get(&id).unwrap().backend_succeeded);
        assert_eq!(f.coordinator.gesture(), GestureState::Idle);
    }

    #[tokio::test]
    async fn drop_on_same_column_does_nothing() {
        let draft = ContentItem::new("drafts.a2", "Draft")
            .with_stage(WorkflowStage::Draft)
            .with_revision("rev-1");
        let f = fixture(vec![draft], no_trigger_calls());
        let id = ItemId::new("drafts.a2");
        let before = f.collection.snapshot();

        f.coordinator.drag_start(&id).unwrap();
        let outcome = f.coordinator.drop_on(Some(WorkflowStage::Draft)).await.unwrap();

        assert_eq!(outcome, TransitionOutcome::Unchanged);
        assert!(f.store.ops().is_empty());
        assert!(Arc::ptr_eq(&before, &f.collection.snapshot()));
    }

    #[tokio::test]
    async fn drop_outside_columns_cancels() {
        let f = fixture(vec![idea("drafts.a1")], no_trigger_calls());

        f.coordinator.drag_start(&ItemId::new("drafts.a1")).unwrap();
        let outcome = f.coordinator.drop_on(None).await.unwrap();

        assert_eq!(outcome, TransitionOutcome::Cancelled);
        assert!(f.store.ops().is_empty());
        assert_eq!(f.coordinator.gesture(), GestureState::Idle);
    }

    #[tokio::test]
    async fn only_draft_patches_to_writing_trigger_job() {
        let draft = ContentItem::new("drafts.a2", "Draft")
            .with_stage(WorkflowStage::Draft)
            .with_body(vec![ContentBlock::paragraph("k1", "Some existing copy")])
            .with_revision("rev-1");
        let f = fixture(vec![draft], {
            let mut trigger = MockTrigger::new();
            trigger
                .expect_trigger_writing()
                .times(1)
                .returning(|_| Ok(ack()));
            trigger
        });
        let id = ItemId::new("drafts.a2");

        f.coordinator.move_item(&id, WorkflowStage::Idea).await.unwrap();
        assert!(f.store.get(&id).unwrap().body.is_empty());
        f.coordinator.move_item(&id, WorkflowStage::Writing).await.unwrap();
    }

    #[tokio::test]
    async fn trigger_failure_rolls_back_and_reverts_store() {
        let mut trigger = MockTrigger::new();
        trigger.expect_trigger_writing().times(1).returning(|_| {
            Err(TriggerError::new(
                JobKind::Writing,
                TriggerFailure::TimedOut { after_ms: 5000 },
            ))
        });
        let original = idea("drafts.a3");
        let f = fixture(vec![original.clone()], trigger);
        let mut notices = f.notices.subscribe();
        let id = ItemId::new("drafts.a3");

        let err = f
            .coordinator
            .move_item(&id, WorkflowStage::Writing)
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::Trigger { .. }));
        assert_eq!(derive_stage(&f.collection.get(&id).unwrap()), WorkflowStage::Idea);
        let stored = f.store.get(&id).unwrap();
        assert_eq!(stored.stage, Some(WorkflowStage::Idea));
        assert!(stored.body.is_empty());

        let notice = notices.recv().await.unwrap();
        assert!(notice.message.starts_with("Backend failed: "));
        assert_eq!(f.coordinator.gesture(), GestureState::Idle);
    }

    #[tokio::test]
    async fn persist_failure_restores_snapshot() {
        let f = fixture(vec![idea("drafts.a1")], no_trigger_calls());
        f.store.fail_next(
            StoreOpKind::Patch,
            StoreError::PermissionDenied("read-only".into()),
        );
        let mut notices = f.notices.subscribe();
        let id = ItemId::new("drafts.a1");
        let before = f.collection.get(&id).unwrap();

        let err = f
            .coordinator
            .move_item(&id, WorkflowStage::Draft)
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::StorePersist { .. }));
        assert_eq!(f.collection.get(&id).unwrap(), before);
        assert_eq!(
            notices.recv().await.unwrap().message,
            "Failed to update article status"
        );
    }

    #[tokio::test]
    async fn published_to_idea_creates_draft_and_deletes_published() {
        let published = ContentItem::new("p1", "Live story")
            .as_published_variant()
            .with_stage(WorkflowStage::Published)
            .with_body(vec![ContentBlock::paragraph("k1", "Long enough published copy")])
            .with_revision("rev-1");
        let f = fixture(vec![published], no_trigger_calls());

        let outcome = f
            .coordinator
            .move_item(&ItemId::new("p1"), WorkflowStage::Idea)
            .await
            .unwrap();

        match outcome {
            TransitionOutcome::Committed { path, job, .. } => {
                assert_eq!(path, PersistPath::Unpublish);
                assert!(job.is_none());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            f.store.ops(),
            vec![
                StoreOp::Create {
                    id: ItemId::new("drafts.p1")
                },
                StoreOp::Delete {
                    id: ItemId::new("p1")
                },
            ]
        );
    }

    #[tokio::test]
    async fn publish_keeps_edit_made_during_drag() {
        let f = fixture(vec![draft_with_copy("drafts.a")], no_trigger_calls());
        let id = ItemId::new("drafts.a");

        f.coordinator.drag_start(&id).unwrap();
        let edit = ItemPatch::new().body(vec![ContentBlock::paragraph("k1", NEW_COPY)]);
        assert_eq!(remote_edit(&f, &id, edit).await, EventDisposition::Applied);
        f.coordinator
            .drop_on(Some(WorkflowStage::Published))
            .await
            .unwrap();

        let published = f.store.get(&ItemId::new("a")).unwrap();
        assert_eq!(body_text(&published), NEW_COPY);
        assert!(f.store.get(&id).is_none());
    }

    #[tokio::test]
    async fn failed_publish_rolls_back_to_edit_made_during_drag() {
        let f = fixture(vec![draft_with_copy("drafts.a")], no_trigger_calls());
        let id = ItemId::new("drafts.a");
        f.store.fail_next(
            StoreOpKind::CreateOrReplace,
            StoreError::Unavailable("offline".into()),
        );

        f.coordinator.drag_start(&id).unwrap();
        let edit = ItemPatch::new().body(vec![ContentBlock::paragraph("k1", NEW_COPY)]);
        remote_edit(&f, &id, edit).await;
        let edited = f.collection.get(&id).unwrap();

        let err = f
            .coordinator
            .drop_on(Some(WorkflowStage::Published))
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::StorePersist { .. }));
        assert_eq!(f.collection.get(&id).unwrap(), edited);
        assert_eq!(derive_stage(&edited), WorkflowStage::Draft);
    }

    #[tokio::test]
    async fn trigger_failure_restores_edit_made_during_drag() {
        let mut trigger = MockTrigger::new();
        trigger.expect_trigger_writing().times(1).returning(|_| {
            Err(TriggerError::new(JobKind::Writing, TriggerFailure::Unauthorized))
        });
        let note = ContentItem::new("drafts.n", "Idea")
            .with_stage(WorkflowStage::Idea)
            .with_body(vec![ContentBlock::paragraph("k1", "old note")])
            .with_revision("rev-1");
        let f = fixture(vec![note], trigger);
        let id = ItemId::new("drafts.n");

        f.coordinator.drag_start(&id).unwrap();
        let edit = ItemPatch::new().body(vec![ContentBlock::paragraph("k1", "new note")]);
        remote_edit(&f, &id, edit).await;
        f.coordinator
            .drop_on(Some(WorkflowStage::Writing))
            .await
            .unwrap_err();

        let stored = f.store.get(&id).unwrap();
        assert_eq!(stored.stage, Some(WorkflowStage::Idea));
        assert_eq!(body_text(&stored), "new note");
        assert_eq!(body_text(&f.collection.get(&id).unwrap()), "new note");
    }

    #[tokio::test]
    async fn edit_landing_mid_commit_is_replayed_after_settle() {
        let store = Arc::new(MemoryStore::with_items(vec![idea("drafts.m")]));
        let gate = Arc::new(Gate::default());
        let gated = Arc::new(GatedStore {
            inner: store.clone(),
            gate: Arc::clone(&gate),
        });
        let f = fixture_over(store, gated, no_trigger_calls());
        let id = ItemId::new("drafts.m");

        f.coordinator.drag_start(&id).unwrap();
        let commit = f.coordinator.drop_on(Some(WorkflowStage::Draft));
        let remote = async {
            gate.entered.notified().await;
            let edit = ItemPatch::new().priority_rating(PriorityRating::HighConfidence);
            let disposition = remote_edit(&f, &id, edit).await;
            assert!(f.collection.is_deferring(&id));
            gate.release.notify_one();
            disposition
        };
        let (outcome, disposition) = tokio::join!(commit, remote);

        assert!(outcome.unwrap().is_committed());
        assert_eq!(disposition, EventDisposition::Deferred);
        assert!(!f.collection.is_deferring(&id));

        let stored = f.store.get(&id).unwrap();
        let shown = f.collection.get(&id).unwrap();
        assert_eq!(shown.revision, stored.revision);
        assert_eq!(shown.priority_rating, Some(PriorityRating::HighConfidence));
        assert_eq!(derive_stage(&shown), WorkflowStage::Draft);
    }

    #[tokio::test]
    async fn second_drag_is_rejected_while_pending() {
        let f = fixture(vec![idea("drafts.a1"), idea("drafts.b1")], no_trigger_calls());

        f.coordinator.drag_start(&ItemId::new("drafts.a1")).unwrap();
        let err = f.coordinator.drag_start(&ItemId::new("drafts.b1")).unwrap_err();

        assert!(matches!(err, BoardError::GestureInProgress));
        f.coordinator.drag_cancel();
        assert!(f.coordinator.drag_start(&ItemId::new("drafts.b1")).is_ok());
    }

    #[tokio::test]
    async fn unknown_item_cannot_be_dragged() {
        let f = fixture(vec![], no_trigger_calls());
        let err = f.coordinator.drag_start(&ItemId::new("drafts.zz")).unwrap_err();
        assert!(matches!(err, BoardError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn drop_without_drag_is_an_error() {
        let f = fixture(vec![], no_trigger_calls());
        let err = f.coordinator.drop_on(Some(WorkflowStage::Draft)).await.unwrap_err();
        assert!(matches!(err, BoardError::NoPendingTransition));
    }

    #[tokio::test(start_paused = true)]
    async fn success_flag_clears_after_ttl() {
        let mut trigger = MockTrigger::new();
        trigger.expect_trigger_writing().returning(|_| Ok(ack()));
        let f = fixture(vec![idea("drafts.a1")], trigger);
        let coordinator = f.coordinator.with_success_flag_ttl(Duration::from_secs(3));
        let id = ItemId::new("drafts.a1");

        coordinator.move_item(&id, WorkflowStage::Writing).await.unwrap();
        assert!(f.collection.get(&id).unwrap().backend_succeeded);

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(f.collection.get(&id).unwrap().backend_succeeded);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!f.collection.get(&id).unwrap().backend_succeeded);
    }
}
