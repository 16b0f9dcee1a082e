//! Dashboard state: buckets, selections and the notification slot.
//!
//! All mutation goes through `&mut self`, so a selection change and the
//! aggregate recompute it triggers can never interleave with another change.

use crate::dispatch::{DispatchComposer, DispatchError, DispatchPayload};
use crate::fetch::{FetchOrchestrator, FetchReport, TIMEOUT_MESSAGE};
use crate::item::{BucketKind, Item, ItemId};
use crate::notify::NotificationController;
use crate::selection::{AggregatedEntry, SelectionAggregator};
use crate::store::CollectionStore;

pub const SENT_MESSAGE: &str = "Newsletter sent successfully!";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send newsletter";
pub const SEND_ERROR_MESSAGE: &str = "Error sending newsletter";
pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one item to send";

/// What a dispatch attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent and selections cleared.
    Sent { items: usize },
    /// Nothing selected; no request made.
    Empty,
    /// Another dispatch was in flight; ignored without a notification.
    Busy,
    /// Request failed; selections kept for a retry.
    Failed(DispatchError),
}

#[derive(Debug)]
pub struct Dashboard {
    store: CollectionStore,
    selection: SelectionAggregator,
    notifications: NotificationController,
}

impl Dashboard {
    pub fn new(notifications: NotificationController) -> Self {
        Self {
            store: CollectionStore::new(),
            selection: SelectionAggregator::new(),
            notifications,
        }
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionAggregator {
        &self.selection
    }

    /// The aggregated selection, in display order.
    pub fn entries(&self) -> &[AggregatedEntry] {
        self.selection.entries()
    }

    pub fn notifications(&self) -> &NotificationController {
        &self.notifications
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Runs one load, keeping buckets that do not settle in their prior state.
    pub async fn refresh(&mut self, orchestrator: &FetchOrchestrator) -> FetchReport {
        let report = orchestrator.run(&mut self.store, &self.notifications).await;
        self.selection.recompute(&self.store);
        report
    }

    /// Full reload: every bucket goes back to pending before loading.
    pub async fn reload(&mut self, orchestrator: &FetchOrchestrator) -> FetchReport {
        self.store.reset();
        self.selection.recompute(&self.store);
        self.refresh(orchestrator).await
    }

    /// Replaces a bucket directly (fixtures, cached data).
    pub fn populate(&mut self, kind: BucketKind, items: Vec<Item>) {
        self.store.populate(kind, items);
        self.selection.recompute(&self.store);
    }

    pub fn toggle(&mut self, kind: BucketKind, id: &ItemId) -> bool {
        self.selection.toggle(&self.store, kind, id)
    }

    pub fn remove(&mut self, kind: BucketKind, id: &ItemId) -> bool {
        self.selection.remove(&self.store, kind, id)
    }

    /// Payload for the current aggregate, detached from later changes.
    pub fn payload(&self) -> DispatchPayload {
        DispatchPayload::compose(self.selection.entries())
    }

    /// Sends the current selection as one digest.
    ///
    /// Raises exactly one notification per attempt that reaches the network
    /// (none when `Busy`). Success clears every selection; failure keeps them.
    pub async fn dispatch(&mut self, composer: &DispatchComposer) -> DispatchOutcome {
        let payload = self.payload();
        if payload.is_empty() {
            self.notifications.error(EMPTY_SELECTION_MESSAGE);
            return DispatchOutcome::Empty;
        }

        match composer.dispatch(&payload).await {
            Ok(()) => {
                self.selection.clear();
                self.notifications.success(SENT_MESSAGE);
                DispatchOutcome::Sent {
                    items: payload.len(),
                }
            }
            Err(DispatchError::Busy) => DispatchOutcome::Busy,
            Err(err) => {
                let text = match err {
                    DispatchError::Status(_) => SEND_FAILED_MESSAGE,
                    DispatchError::Timeout => TIMEOUT_MESSAGE,
                    DispatchError::Transport(_) | DispatchError::Busy => SEND_ERROR_MESSAGE,
                };
                self.notifications.error(text);
                DispatchOutcome::Failed(err)
            }
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(NotificationController::default())
    }
}
