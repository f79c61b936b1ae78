use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use reqwest::{
    StatusCode,
    blocking::{Client, Response},
    header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT},
};
use url::Url;

use crate::{Fetch, FetchRequest, Outcome, ParsedFeed, parse::parse_feed};

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed :: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(StatusCode),

    #[error("cannot read `{}` :: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse feed :: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Fetches feeds over http(s) with conditional requests, or from the local
/// filesystem for `file://` urls and plain paths.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

#[derive(Debug, Clone)]
pub struct HttpFetcherBuilder {
    timeout: Duration,
}

impl HttpFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    fn get(&self, request: &FetchRequest) -> Outcome<ParsedFeed> {
        let mut builder = self
            .client
            .get(request.url.as_str())
            .header(USER_AGENT, request.user_agent.as_str());
        if let Some(etag) = &request.etag {
            builder = builder.header(IF_NONE_MATCH, etag.as_str());
        }
        if let Some(modified) = &request.modified {
            builder = builder.header(IF_MODIFIED_SINCE, modified.as_str());
        }

        let response = match builder.send() {
            Ok(response) => response,
            Err(err) => {
                return Outcome::Error(ParsedFeed::bozo(
                    &request.url,
                    None,
                    FetchError::from(err),
                ));
            }
        };

        let status = response.status();
        let href = response.url().to_string();
        let etag = header(&response, ETAG);
        let modified = header(&response, LAST_MODIFIED);

        #[cfg(feature = "tracing")]
        tracing::debug!(%status, ?etag, ?modified, "response");

        if status == StatusCode::NOT_MODIFIED {
            return Outcome::NotModified(ParsedFeed {
                href,
                status: Some(status.as_u16()),
                etag,
                modified,
                ..Default::default()
            });
        }

        if !status.is_success() {
            return Outcome::Error(ParsedFeed::bozo(
                href,
                Some(status.as_u16()),
                FetchError::Status(status),
            ));
        }

        let body = match response.bytes() {
            Ok(body) => body,
            Err(err) => {
                return Outcome::Error(ParsedFeed::bozo(
                    href,
                    Some(status.as_u16()),
                    FetchError::from(err),
                ));
            }
        };

        parsed(href, Some(status.as_u16()), etag, modified, &body)
    }

    fn read(&self, request: &FetchRequest, path: &Path) -> Outcome<ParsedFeed> {
        match fs::read(path) {
            Ok(body) => parsed(request.url.clone(), None, None, None, &body),
            Err(source) => Outcome::Error(ParsedFeed::bozo(
                &request.url,
                None,
                FetchError::Io {
                    path: path.to_owned(),
                    source,
                },
            )),
        }
    }
}

impl Fetch for HttpFetcher {
    type Value = Arc<ParsedFeed>;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", fields(url = %request.url, conditional = request.is_conditional()), skip_all)
    )]
    fn fetch(&self, request: &FetchRequest) -> Outcome<Arc<ParsedFeed>> {
        match local_path(&request.url) {
            Some(path) => self.read(request, &path),
            None => self.get(request),
        }
        .map(Arc::new)
    }
}

impl HttpFetcherBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpFetcher, FetchError> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(HttpFetcher { client })
    }
}

fn parsed(
    href: String,
    status: Option<u16>,
    etag: Option<String>,
    modified: Option<String>,
    body: &[u8],
) -> Outcome<ParsedFeed> {
    match parse_feed(body) {
        Ok((feed, entries)) => Outcome::Fresh(ParsedFeed {
            href,
            status,
            etag,
            modified,
            feed,
            entries,
            ..Default::default()
        }),
        Err(err) => Outcome::Error(ParsedFeed {
            etag,
            modified,
            ..ParsedFeed::bozo(href, status, FetchError::from(err))
        }),
    }
}

fn header(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// `None` for anything that should go over the network.
fn local_path(source: &str) -> Option<PathBuf> {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => Some(PathBuf::from(source)),
    }
}
