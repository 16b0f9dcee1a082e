//! Item model shared by all three buckets.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// Identifier of an item, unique only within its bucket.
///
/// Upstream endpoints send either numbers or strings. `1` and `"1"` are
/// different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Number(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Text(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::Text(value)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    /// Integers parse as numeric ids, anything else as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| ItemId::Text(trimmed.to_string()), ItemId::Number))
    }
}

/// One of the three independently fetched collections.
///
/// Declaration order is the fixed aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Posts,
    Events,
    ExternalEvents,
}

impl BucketKind {
    pub const ALL: [BucketKind; 3] = [
        BucketKind::Posts,
        BucketKind::Events,
        BucketKind::ExternalEvents,
    ];

    /// Wire key, as used in the digest payload.
    pub fn key(self) -> &'static str {
        match self {
            BucketKind::Posts => "posts",
            BucketKind::Events => "events",
            BucketKind::ExternalEvents => "external_events",
        }
    }

    /// Human-readable label for messages.
    pub fn label(self) -> &'static str {
        match self {
            BucketKind::Posts => "posts",
            BucketKind::Events => "events",
            BucketKind::ExternalEvents => "external events",
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BucketKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "posts" | "post" => Ok(BucketKind::Posts),
            "events" | "event" => Ok(BucketKind::Events),
            "external_events" | "external-events" | "external" => Ok(BucketKind::ExternalEvents),
            other => bail!("Unknown bucket '{other}' (expected posts, events or external-events)"),
        }
    }
}

/// Normalized item as held by a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Display name (post title, event name).
    pub title: String,
    pub description: String,
    /// Media URLs, primary image first.
    pub media: Vec<String>,
    /// Source or type label.
    pub source: String,
    /// Timestamp as received from upstream.
    pub timestamp: Option<String>,
    pub detail: ItemDetail,
}

/// Fields only one bucket type carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemDetail {
    Post {
        link: Option<String>,
    },
    Event {
        presenter: Option<String>,
        presenter_image: Option<String>,
        location: Option<String>,
        invite_link: Option<String>,
    },
    ExternalEvent {
        link: Option<String>,
        location: Option<String>,
    },
}

impl Item {
    /// Primary image, if any.
    pub fn image(&self) -> Option<&str> {
        self.media.first().map(String::as_str)
    }

    /// Description cut to `max_words` words, with an ellipsis when truncated.
    pub fn summary(&self, max_words: usize) -> String {
        let words: Vec<&str> = self.description.split_whitespace().collect();
        if words.len() <= max_words {
            return words.join(" ");
        }
        format!("{}...", words[..max_words].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(description: &str) -> Item {
        Item {
            id: ItemId::Number(1),
            title: "t".to_string(),
            description: description.to_string(),
            media: Vec::new(),
            source: "s".to_string(),
            timestamp: None,
            detail: ItemDetail::Post { link: None },
        }
    }

    #[test]
    fn test_item_id_parses_numbers_and_text() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::Number(42));
        assert_eq!(
            "ext-1-0".parse::<ItemId>().unwrap(),
            ItemId::Text("ext-1-0".to_string())
        );
    }

    #[test]
    fn test_item_id_numeric_and_text_differ() {
        assert_ne!(ItemId::Number(1), ItemId::Text("1".to_string()));
    }

    #[test]
    fn test_item_id_deserializes_untagged() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[7, "abc"]"#).unwrap();
        assert_eq!(ids, vec![ItemId::Number(7), ItemId::from("abc")]);
    }

    #[test]
    fn test_bucket_kind_parse_accepts_aliases() {
        assert_eq!(
            "external-events".parse::<BucketKind>().unwrap(),
            BucketKind::ExternalEvents
        );
        assert_eq!("Posts".parse::<BucketKind>().unwrap(), BucketKind::Posts);
        assert!("users".parse::<BucketKind>().is_err());
    }

    #[test]
    fn test_summary_truncates_to_word_limit() {
        let item = post("one two three four");
        assert_eq!(item.summary(2), "one two...");
        assert_eq!(item.summary(4), "one two three four");
    }
}
