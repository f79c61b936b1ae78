use httpmock::{Method::GET, Mock, MockServer};

use super::FEED_DATA;

pub const PATH: &str = "/feedcache/atom/";
pub const ETAG: &str = "\"6c1d5e0a3f\"";
pub const LAST_MODIFIED: &str = "Sat, 14 Oct 2006 11:00:36 GMT";

/// Serves the same feed every time. With `apply_validators`, a request
/// whose `If-None-Match` or `If-Modified-Since` matches gets a bare 304.
pub struct FeedMocks<'s> {
    full: Mock<'s>,
    by_etag: Option<Mock<'s>>,
    by_modified: Option<Mock<'s>>,
}

impl<'s> FeedMocks<'s> {
    pub fn install(server: &'s MockServer, apply_validators: bool) -> Self {
        let full = server.mock(|when, then| {
            let when = when.method(GET).path(PATH);
            if apply_validators {
                when.header_missing("if-none-match")
                    .header_missing("if-modified-since");
            }
            then.status(200)
                .header("content-type", "application/atom+xml")
                .header("etag", ETAG)
                .header("last-modified", LAST_MODIFIED)
                .body(FEED_DATA);
        });

        if !apply_validators {
            return Self {
                full,
                by_etag: None,
                by_modified: None,
            };
        }

        let by_etag = server.mock(|when, then| {
            when.method(GET).path(PATH).header("if-none-match", ETAG);
            then.status(304);
        });

        let by_modified = server.mock(|when, then| {
            when.method(GET)
                .path(PATH)
                .header_missing("if-none-match")
                .header("if-modified-since", LAST_MODIFIED);
            then.status(304);
        });

        Self {
            full,
            by_etag: Some(by_etag),
            by_modified: Some(by_modified),
        }
    }

    pub fn full_responses(&self) -> usize {
        self.full.hits()
    }

    pub fn not_modified_responses(&self) -> usize {
        self.by_etag.as_ref().map_or(0, Mock::hits) + self.by_modified.as_ref().map_or(0, Mock::hits)
    }

    pub fn etag_hits(&self) -> usize {
        self.by_etag.as_ref().map_or(0, Mock::hits)
    }

    pub fn modified_hits(&self) -> usize {
        self.by_modified.as_ref().map_or(0, Mock::hits)
    }

    pub fn requests(&self) -> usize {
        self.full_responses() + self.not_modified_responses()
    }
}
