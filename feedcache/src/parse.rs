use feed_rs::{
    model::{Entry, Feed, Link, Text},
    parser::{self, ParseFeedError},
};

use crate::{Enclosure, FeedEntry, FeedMeta};

/// Parses an RSS, Atom or JSON feed body.
pub(crate) fn parse_feed(body: &[u8]) -> Result<(FeedMeta, Vec<FeedEntry>), ParseFeedError> {
    let feed = parser::parse(body)?;
    Ok((meta(&feed), feed.entries.iter().map(entry).collect()))
}

fn meta(feed: &Feed) -> FeedMeta {
    FeedMeta {
        id: Some(feed.id.clone()).filter(|id| !id.is_empty()),
        title: feed.title.as_ref().map(text),
        subtitle: feed.description.as_ref().map(text),
        link: alternate(&feed.links),
        updated: feed.updated.map(|at| at.to_rfc3339()),
    }
}

fn entry(entry: &Entry) -> FeedEntry {
    FeedEntry {
        id: entry.id.clone(),
        title: entry.title.as_ref().map(text),
        link: alternate(&entry.links),
        summary: entry.summary.as_ref().map(text),
        updated: entry.updated.map(|at| at.to_rfc3339()),
        published: entry.published.map(|at| at.to_rfc3339()),
        authors: entry.authors.iter().map(|p| p.name.clone()).collect(),
        enclosures: entry
            .links
            .iter()
            .filter(|link| link.rel.as_deref() == Some("enclosure"))
            .map(|link| Enclosure {
                href: link.href.clone(),
                media_type: link.media_type.clone(),
                length: link.length,
            })
            .collect(),
    }
}

fn text(text: &Text) -> String {
    text.content.trim().to_owned()
}

// rss links carry no rel, atom ones mostly say "alternate"
fn alternate(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|link| link.href.clone())
}
