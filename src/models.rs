use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Platform classification of a saved item. Drives how representative text
/// is obtained for summarization; adding a variant forces every dispatch
/// site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Twitter,
    Youtube,
    Instagram,
    Linkedin,
    Tiktok,
    Document,
    Link,
    Notes,
}

impl ContentKind {
    pub const ALL: [ContentKind; 8] = [
        ContentKind::Twitter,
        ContentKind::Youtube,
        ContentKind::Instagram,
        ContentKind::Linkedin,
        ContentKind::Tiktok,
        ContentKind::Document,
        ContentKind::Link,
        ContentKind::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Twitter => "twitter",
            ContentKind::Youtube => "youtube",
            ContentKind::Instagram => "instagram",
            ContentKind::Linkedin => "linkedin",
            ContentKind::Tiktok => "tiktok",
            ContentKind::Document => "document",
            ContentKind::Link => "link",
            ContentKind::Notes => "notes",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// A saved item: a link, a bookmarked document, or a free-text note (for
/// `notes`, `link` holds the note body). Immutable once created except for
/// deletion; always owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub tags: Vec<String>,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(
        title: String,
        link: String,
        kind: ContentKind,
        tags: Vec<String>,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            link,
            kind,
            tags,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Public handle onto one user's whole collection. At most one per user;
/// deleted on opt-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub hash: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn new(hash: String, user_id: Uuid) -> Self {
        Self {
            hash,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_name() {
        for kind in ContentKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
            let back: ContentKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn kind_parses_known_names_only() {
        assert_eq!("youtube".parse::<ContentKind>(), Ok(ContentKind::Youtube));
        assert_eq!("notes".parse::<ContentKind>(), Ok(ContentKind::Notes));
        assert!("rss".parse::<ContentKind>().is_err());
        assert!("YouTube".parse::<ContentKind>().is_err());
    }

    #[test]
    fn content_item_wire_format_uses_camel_case() {
        let item = ContentItem::new(
            "Title".into(),
            "https://example.com".into(),
            ContentKind::Link,
            vec![],
            Uuid::new_v4(),
        );
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("user_id").is_none());
    }
}
