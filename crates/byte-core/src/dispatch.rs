//! Digest payload composition and single-flight sending.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::backend::BackendClient;
use crate::item::BucketKind;
use crate::selection::AggregatedEntry;
use crate::wire::{EventEntry, ExternalEventEntry, PostEntry};

/// Body of the digest request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchPayload {
    pub posts: Vec<PostEntry>,
    pub events: Vec<EventEntry>,
    pub external_events: Vec<ExternalEventEntry>,
}

impl DispatchPayload {
    /// Partitions aggregated entries back into typed lists by their recorded kind.
    pub fn compose(entries: &[AggregatedEntry]) -> Self {
        let mut payload = Self::default();
        for entry in entries {
            match entry.kind {
                BucketKind::Posts => payload.posts.push(PostEntry::from(&entry.item)),
                BucketKind::Events => payload.events.push(EventEntry::from(&entry.item)),
                BucketKind::ExternalEvents => payload
                    .external_events
                    .push(ExternalEventEntry::from(&entry.item)),
            }
        }
        payload
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.events.len() + self.external_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Another dispatch on this composer is still in flight.
    Busy,
    /// The backend answered with a non-2xx status.
    Status(u16),
    /// The request never completed.
    Transport(String),
    /// The shared deadline elapsed first.
    Timeout,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Busy => write!(f, "A digest is already being sent"),
            DispatchError::Status(code) => write!(f, "Digest endpoint returned status {code}"),
            DispatchError::Transport(err) => write!(f, "Digest request failed: {err}"),
            DispatchError::Timeout => write!(f, "Digest request timed out"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Sends digests, at most one at a time per instance.
#[derive(Debug)]
pub struct DispatchComposer {
    client: BackendClient,
    deadline: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the send ends (including cancellation).
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DispatchComposer {
    pub fn new(client: BackendClient, deadline: Duration) -> Self {
        Self {
            client,
            deadline,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Sends `payload` to the digest endpoint.
    ///
    /// Returns [`DispatchError::Busy`] without sending if a previous call on
    /// this composer has not finished.
    pub async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("dispatch rejected: already in flight");
            return Err(DispatchError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        tracing::info!(
            posts = payload.posts.len(),
            events = payload.events.len(),
            external_events = payload.external_events.len(),
            "sending digest"
        );
        let result = match tokio::time::timeout(self.deadline, self.client.send_digest(payload)).await
        {
            Err(_) => Err(DispatchError::Timeout),
            Ok(Err(err)) => Err(DispatchError::Transport(err.to_string())),
            Ok(Ok(status)) if status.is_success() => Ok(()),
            Ok(Ok(status)) => Err(DispatchError::Status(status.as_u16())),
        };

        match &result {
            Ok(()) => tracing::info!("digest sent"),
            Err(err) => tracing::warn!(error = %err, "digest failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::item::{Item, ItemDetail, ItemId};

    fn entry(kind: BucketKind, id: i64) -> AggregatedEntry {
        let detail = match kind {
            BucketKind::Posts => ItemDetail::Post {
                link: Some(format!("https://blog/{id}")),
            },
            BucketKind::Events => ItemDetail::Event {
                presenter: Some("Ada".to_string()),
                presenter_image: None,
                location: Some("Room 1".to_string()),
                invite_link: None,
            },
            BucketKind::ExternalEvents => ItemDetail::ExternalEvent {
                link: None,
                location: Some("Online".to_string()),
            },
        };
        AggregatedEntry {
            kind,
            item: Item {
                id: ItemId::Number(id),
                title: format!("{kind} {id}"),
                description: "d".to_string(),
                media: vec![format!("https://img/{id}.png")],
                source: "src".to_string(),
                timestamp: Some("2025-01-01".to_string()),
                detail,
            },
        }
    }

    #[test]
    fn test_compose_partitions_by_recorded_kind() {
        let entries = vec![
            entry(BucketKind::Posts, 1),
            entry(BucketKind::Events, 1),
            entry(BucketKind::ExternalEvents, 1),
            entry(BucketKind::Posts, 2),
        ];
        let payload = DispatchPayload::compose(&entries);

        assert_eq!(payload.posts.len(), 2);
        assert_eq!(payload.events.len(), 1);
        assert_eq!(payload.external_events.len(), 1);
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = DispatchPayload::compose(&[
            entry(BucketKind::Posts, 1),
            entry(BucketKind::Events, 1),
            entry(BucketKind::ExternalEvents, 7),
        ]);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value["posts"][0],
            json!({
                "id": 1,
                "title": "posts 1",
                "description": "d",
                "image_url": "https://img/1.png",
                "link": "https://blog/1",
                "source": "src",
                "published": "2025-01-01"
            })
        );
        assert_eq!(value["events"][0]["event_name"], json!("events 1"));
        assert_eq!(value["events"][0]["presenter"], json!("Ada"));
        assert_eq!(value["events"][0]["invite_location"], json!("Room 1"));
        assert_eq!(value["external_events"][0]["location"], json!("Online"));
        assert_eq!(value["external_events"][0]["date"], json!("2025-01-01"));
    }

    #[test]
    fn test_empty_payload_keeps_all_keys() {
        let value = serde_json::to_value(DispatchPayload::default()).unwrap();
        assert_eq!(
            value,
            json!({ "posts": [], "events": [], "external_events": [] })
        );
    }
}
