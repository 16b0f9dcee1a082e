//! Wire shapes of the backend: feed responses in, digest entries out.
//!
//! Each feed gets a typed mapper so a malformed body fails here, at the
//! bucket boundary, instead of leaking half-filled items downstream.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::item::{BucketKind, Item, ItemDetail, ItemId};

/// Source label for posts whose feed entry carries none.
pub const DEFAULT_POST_SOURCE: &str = "NVIDIA Blog";

/// Per-load inputs for mappers.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext {
    /// Load start in unix millis; seeds synthesized ids.
    pub generation_millis: i64,
}

/// Maps a raw response body into bucket items.
pub type Mapper = fn(&[u8], &LoadContext) -> Result<Vec<Item>>;

/// Mapper for a bucket kind.
pub fn mapper_for(kind: BucketKind) -> Mapper {
    match kind {
        BucketKind::Posts => map_posts,
        BucketKind::Events => map_events,
        BucketKind::ExternalEvents => map_external_events,
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RssUpdatesResponse {
    updates: Vec<RssUpdate>,
}

#[derive(Debug, Deserialize)]
struct RssUpdate {
    id: ItemId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    id: ItemId,
    event_name: String,
    #[serde(default)]
    presenter: Option<String>,
    #[serde(default)]
    presenter_images: Option<String>,
    #[serde(default)]
    event_images: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    invite_location: Option<String>,
    #[serde(default)]
    invite_link: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalEventsResponse {
    external_events: Vec<ExternalEventRecord>,
}

#[derive(Debug, Deserialize)]
struct ExternalEventRecord {
    #[serde(default)]
    id: Option<ItemId>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn map_posts(body: &[u8], _ctx: &LoadContext) -> Result<Vec<Item>> {
    let response: RssUpdatesResponse =
        serde_json::from_slice(body).context("Failed to parse posts response")?;
    Ok(response
        .updates
        .into_iter()
        .map(|update| Item {
            id: update.id,
            title: update.title,
            description: update.description.unwrap_or_default(),
            media: non_empty(update.image_url).into_iter().collect(),
            source: non_empty(update.source).unwrap_or_else(|| DEFAULT_POST_SOURCE.to_string()),
            timestamp: non_empty(update.published),
            detail: ItemDetail::Post {
                link: non_empty(update.link),
            },
        })
        .collect())
}

pub fn map_events(body: &[u8], _ctx: &LoadContext) -> Result<Vec<Item>> {
    let response: EventsResponse =
        serde_json::from_slice(body).context("Failed to parse events response")?;
    Ok(response
        .events
        .into_iter()
        .map(|event| Item {
            id: event.id,
            title: event.event_name,
            description: event.description.unwrap_or_default(),
            media: non_empty(event.event_images).into_iter().collect(),
            source: non_empty(event.event_type).unwrap_or_default(),
            timestamp: non_empty(event.date_time),
            detail: ItemDetail::Event {
                presenter: non_empty(event.presenter),
                presenter_image: non_empty(event.presenter_images),
                location: non_empty(event.invite_location),
                invite_link: non_empty(event.invite_link),
            },
        })
        .collect())
}

/// External feeds may omit ids; missing ones become
/// `ext-<generation_millis>-<index>`, stable for the whole load.
pub fn map_external_events(body: &[u8], ctx: &LoadContext) -> Result<Vec<Item>> {
    let response: ExternalEventsResponse =
        serde_json::from_slice(body).context("Failed to parse external events response")?;
    Ok(response
        .external_events
        .into_iter()
        .enumerate()
        .map(|(index, event)| Item {
            id: event.id.unwrap_or_else(|| {
                ItemId::Text(format!("ext-{}-{index}", ctx.generation_millis))
            }),
            title: event.title,
            description: event.description.unwrap_or_default(),
            media: non_empty(event.image_url).into_iter().collect(),
            source: non_empty(event.source).unwrap_or_default(),
            timestamp: non_empty(event.date),
            detail: ItemDetail::ExternalEvent {
                link: non_empty(event.link),
                location: non_empty(event.location),
            },
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostEntry {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub source: String,
    pub published: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEntry {
    pub id: ItemId,
    pub event_name: String,
    pub presenter: Option<String>,
    pub description: String,
    pub event_images: Option<String>,
    pub presenter_images: Option<String>,
    pub event_type: String,
    pub date_time: Option<String>,
    pub invite_location: Option<String>,
    pub invite_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalEventEntry {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub source: String,
    pub date: Option<String>,
    pub location: Option<String>,
}

impl From<&Item> for PostEntry {
    fn from(item: &Item) -> Self {
        let link = match &item.detail {
            ItemDetail::Post { link } | ItemDetail::ExternalEvent { link, .. } => link.clone(),
            ItemDetail::Event { invite_link, .. } => invite_link.clone(),
        };
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image().map(str::to_string),
            link,
            source: item.source.clone(),
            published: item.timestamp.clone(),
        }
    }
}

impl From<&Item> for EventEntry {
    fn from(item: &Item) -> Self {
        let (presenter, presenter_images, invite_location, invite_link) = match &item.detail {
            ItemDetail::Event {
                presenter,
                presenter_image,
                location,
                invite_link,
            } => (
                presenter.clone(),
                presenter_image.clone(),
                location.clone(),
                invite_link.clone(),
            ),
            ItemDetail::Post { link } => (None, None, None, link.clone()),
            ItemDetail::ExternalEvent { link, location } => {
                (None, None, location.clone(), link.clone())
            }
        };
        Self {
            id: item.id.clone(),
            event_name: item.title.clone(),
            presenter,
            description: item.description.clone(),
            event_images: item.image().map(str::to_string),
            presenter_images,
            event_type: item.source.clone(),
            date_time: item.timestamp.clone(),
            invite_location,
            invite_link,
        }
    }
}

impl From<&Item> for ExternalEventEntry {
    fn from(item: &Item) -> Self {
        let (link, location) = match &item.detail {
            ItemDetail::ExternalEvent { link, location } => (link.clone(), location.clone()),
            ItemDetail::Post { link } => (link.clone(), None),
            ItemDetail::Event {
                location,
                invite_link,
                ..
            } => (invite_link.clone(), location.clone()),
        };
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image().map(str::to_string),
            link,
            source: item.source.clone(),
            date: item.timestamp.clone(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CTX: LoadContext = LoadContext {
        generation_millis: 1_700_000_000_000,
    };

    #[test]
    fn test_map_posts_normalizes_fields() {
        let body = json!({
            "updates": [{
                "id": 3,
                "title": "GPU news",
                "description": "Fresh silicon",
                "image_url": "https://img/1.png",
                "link": "https://blog/1",
                "published": "2025-01-02T00:00:00Z"
            }]
        });
        let items = map_posts(body.to_string().as_bytes(), &CTX).unwrap();

        assert_eq!(items.len(), 1);
        let post = &items[0];
        assert_eq!(post.id, ItemId::Number(3));
        assert_eq!(post.source, DEFAULT_POST_SOURCE);
        assert_eq!(post.image(), Some("https://img/1.png"));
        assert_eq!(
            post.detail,
            ItemDetail::Post {
                link: Some("https://blog/1".to_string())
            }
        );
    }

    #[test]
    fn test_map_posts_rejects_wrong_shape() {
        let body = json!({ "events": [] });
        let err = map_posts(body.to_string().as_bytes(), &CTX).unwrap_err();
        assert!(format!("{err:#}").contains("posts response"));
    }

    #[test]
    fn test_map_events_keeps_presenter_fields() {
        let body = json!({
            "events": [{
                "id": "e-1",
                "event_name": "Rust meetup",
                "presenter": "Ada",
                "presenter_images": "https://img/ada.png",
                "event_images": "",
                "event_type": "Talk",
                "date_time": "2025-03-01T18:00:00Z",
                "invite_location": "Room 4",
                "invite_link": "https://meet/1"
            }]
        });
        let items = map_events(body.to_string().as_bytes(), &CTX).unwrap();

        let event = &items[0];
        assert_eq!(event.title, "Rust meetup");
        assert!(event.media.is_empty(), "empty image strings are dropped");
        assert_eq!(event.source, "Talk");
        assert_eq!(
            event.detail,
            ItemDetail::Event {
                presenter: Some("Ada".to_string()),
                presenter_image: Some("https://img/ada.png".to_string()),
                location: Some("Room 4".to_string()),
                invite_link: Some("https://meet/1".to_string()),
            }
        );
    }

    #[test]
    fn test_map_external_events_synthesizes_missing_ids() {
        let body = json!({
            "external_events": [
                { "title": "A" },
                { "id": 9, "title": "B" },
                { "title": "C" }
            ]
        });
        let items = map_external_events(body.to_string().as_bytes(), &CTX).unwrap();

        assert_eq!(items[0].id, ItemId::from("ext-1700000000000-0"));
        assert_eq!(items[1].id, ItemId::Number(9));
        assert_eq!(items[2].id, ItemId::from("ext-1700000000000-2"));
    }

    #[test]
    fn test_synthesized_ids_are_reproducible_for_a_load() {
        let body = json!({ "external_events": [{ "title": "A" }] }).to_string();
        let first = map_external_events(body.as_bytes(), &CTX).unwrap();
        let second = map_external_events(body.as_bytes(), &CTX).unwrap();
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn test_event_entry_projection() {
        let body = json!({
            "events": [{ "id": 5, "event_name": "Demo day", "invite_link": "https://x" }]
        });
        let items = map_events(body.to_string().as_bytes(), &CTX).unwrap();
        let entry = EventEntry::from(&items[0]);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["id"], json!(5));
        assert_eq!(value["event_name"], json!("Demo day"));
        assert_eq!(value["invite_link"], json!("https://x"));
        assert_eq!(value["presenter"], json!(null));
    }
}
