use serde::{Deserialize, Serialize};

use crate::FeedContent;

/// Result of fetching and parsing one feed, along with the HTTP metadata
/// needed to revalidate it later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeed {
    /// Where the content came from, after redirects.
    pub href: String,
    pub status: Option<u16>,
    pub etag: Option<String>,
    pub modified: Option<String>,
    pub bozo: bool,
    pub bozo_exception: Option<String>,
    pub feed: FeedMeta,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub updated: Option<String>,
    pub published: Option<String>,
    pub authors: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub href: String,
    pub media_type: Option<String>,
    pub length: Option<u64>,
}

impl ParsedFeed {
    /// A failed fetch of `href`. Carries no content.
    pub fn bozo(href: impl Into<String>, status: Option<u16>, err: impl std::error::Error) -> Self {
        Self {
            href: href.into(),
            status,
            bozo: true,
            bozo_exception: Some(err.to_string()),
            ..Default::default()
        }
    }
}

impl FeedContent for ParsedFeed {
    #[inline]
    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    #[inline]
    fn last_modified(&self) -> Option<&str> {
        self.modified.as_deref()
    }

    #[inline]
    fn is_bozo(&self) -> bool {
        self.bozo
    }
}
