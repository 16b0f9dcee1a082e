//! Concurrent bucket loading under one shared deadline.
//!
//! Every resource is fetched on its own task. Results come back over a
//! channel that only the caller drains, so buckets are mutated on the
//! caller's task. The deadline does not abort requests: when it fires the
//! receiver is dropped and anything that settles later is discarded.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::backend::BackendClient;
use crate::item::{BucketKind, Item};
use crate::notify::NotificationController;
use crate::store::CollectionStore;
use crate::wire::{LoadContext, Mapper, mapper_for};

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";

/// A read endpoint and how to turn its body into items.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub kind: BucketKind,
    pub mapper: Mapper,
}

impl Resource {
    pub fn new(kind: BucketKind) -> Self {
        Self {
            kind,
            mapper: mapper_for(kind),
        }
    }

    /// Posts, events and external events, in that order.
    pub fn all() -> Vec<Resource> {
        BucketKind::ALL.into_iter().map(Resource::new).collect()
    }
}

/// Outcome of one load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub run: u64,
    pub loaded: Vec<BucketKind>,
    /// Failed buckets with the error chain.
    pub failed: Vec<(BucketKind, String)>,
    /// Buckets still unsettled when the deadline fired.
    pub pending: Vec<BucketKind>,
    pub timed_out: bool,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        !self.timed_out && self.failed.is_empty()
    }
}

pub struct FetchOrchestrator {
    client: BackendClient,
    resources: Vec<Resource>,
    deadline: Duration,
}

impl FetchOrchestrator {
    pub fn new(client: BackendClient, resources: Vec<Resource>, deadline: Duration) -> Self {
        Self {
            client,
            resources,
            deadline,
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Loads every resource concurrently into `store`.
    ///
    /// `loading` goes true → false exactly once, when all resources settle or
    /// the deadline fires, whichever comes first. Never fails: per-resource
    /// errors mark their bucket failed and show an error notification.
    pub async fn run(
        &self,
        store: &mut CollectionStore,
        notifications: &NotificationController,
    ) -> FetchReport {
        let run = store.begin_load();
        let ctx = LoadContext {
            generation_millis: chrono::Utc::now().timestamp_millis(),
        };
        tracing::info!(run, resources = self.resources.len(), "load started");

        let (tx, mut rx) = mpsc::unbounded_channel::<(BucketKind, Result<Vec<Item>>)>();
        for resource in &self.resources {
            let client = self.client.clone();
            let resource = *resource;
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = fetch_resource(&client, resource, &ctx).await;
                if tx.send((resource.kind, result)).is_err() {
                    tracing::debug!(run, kind = %resource.kind, "discarding result settled after deadline");
                }
            });
        }
        drop(tx);

        let mut report = FetchReport {
            run,
            ..FetchReport::default()
        };
        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;

                settled = rx.recv() => {
                    let Some((kind, result)) = settled else {
                        break;
                    };
                    match result {
                        Ok(items) => {
                            tracing::info!(run, %kind, count = items.len(), "bucket loaded");
                            store.populate(kind, items);
                            report.loaded.push(kind);
                        }
                        Err(err) => {
                            tracing::warn!(run, %kind, error = %format!("{err:#}"), "bucket failed");
                            store.mark_failed(kind);
                            notifications.error(format!("Failed to load {}", kind.label()));
                            report.failed.push((kind, format!("{err:#}")));
                        }
                    }
                }
                () = &mut deadline => {
                    tracing::warn!(run, deadline = ?self.deadline, "load deadline elapsed");
                    report.timed_out = true;
                    notifications.error(TIMEOUT_MESSAGE);
                    break;
                }
            }
        }
        // Late results go nowhere once the receiver is gone.
        drop(rx);

        report.pending = self
            .resources
            .iter()
            .map(|resource| resource.kind)
            .filter(|kind| {
                !report.loaded.contains(kind) && !report.failed.iter().any(|(k, _)| k == kind)
            })
            .collect();
        store.finish_load();
        tracing::info!(
            run,
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            pending = report.pending.len(),
            "load finished"
        );
        report
    }
}

async fn fetch_resource(
    client: &BackendClient,
    resource: Resource,
    ctx: &LoadContext,
) -> Result<Vec<Item>> {
    let body = client.fetch_bucket(resource.kind).await?;
    (resource.mapper)(&body, ctx)
        .with_context(|| format!("Failed to map {} response", resource.kind.label()))
}
