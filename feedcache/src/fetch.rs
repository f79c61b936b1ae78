use std::sync::Arc;

/// The parts of a cached value the cache itself looks at.
pub trait FeedContent {
    /// `ETag` of the response that produced this value.
    fn etag(&self) -> Option<&str>;

    /// `Last-Modified` of the response that produced this value.
    fn last_modified(&self) -> Option<&str>;

    /// Set when fetching or parsing failed. Such values are never stored.
    fn is_bozo(&self) -> bool;
}

impl<T> FeedContent for Arc<T>
where
    T: FeedContent + ?Sized,
{
    #[inline]
    fn etag(&self) -> Option<&str> {
        (**self).etag()
    }

    #[inline]
    fn last_modified(&self) -> Option<&str> {
        (**self).last_modified()
    }

    #[inline]
    fn is_bozo(&self) -> bool {
        (**self).is_bozo()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub etag: Option<String>,
    pub modified: Option<String>,
    pub user_agent: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            etag: None,
            modified: None,
            user_agent: user_agent.into(),
        }
    }

    /// Carries over the validators of a previously fetched value.
    pub fn revalidating<V: FeedContent>(mut self, cached: &V) -> Self {
        self.etag = cached.etag().map(str::to_owned);
        self.modified = cached.last_modified().map(str::to_owned);
        self
    }

    #[inline]
    pub fn is_conditional(&self) -> bool {
        self.etag.is_some() || self.modified.is_some()
    }
}

/// How a single fetch ended. Every variant carries a value so the caller
/// always gets something back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// New content (HTTP 200).
    Fresh(V),
    /// The validators still match (HTTP 304). The value only describes the
    /// response, there is no content in it.
    NotModified(V),
    /// Transport, status or parse failure. The value is flagged bozo.
    Error(V),
}

impl<V> Outcome<V> {
    pub fn into_inner(self) -> V {
        match self {
            Outcome::Fresh(v) | Outcome::NotModified(v) | Outcome::Error(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Outcome<U> {
        match self {
            Outcome::Fresh(v) => Outcome::Fresh(f(v)),
            Outcome::NotModified(v) => Outcome::NotModified(f(v)),
            Outcome::Error(v) => Outcome::Error(f(v)),
        }
    }
}

/// Retrieves and parses one source. Timeouts belong here, not in the cache.
pub trait Fetch {
    type Value;

    fn fetch(&self, request: &FetchRequest) -> Outcome<Self::Value>;
}

impl<F> Fetch for Arc<F>
where
    F: Fetch + ?Sized,
{
    type Value = F::Value;

    fn fetch(&self, request: &FetchRequest) -> Outcome<Self::Value> {
        (**self).fetch(request)
    }
}

/// Adapts a closure into a [`Fetch`].
pub fn fetch_fn<F, V>(f: F) -> FetchFn<F>
where
    F: Fn(&FetchRequest) -> Outcome<V>,
{
    FetchFn(f)
}

#[derive(Clone, Copy)]
pub struct FetchFn<F>(F);

impl<F, V> Fetch for FetchFn<F>
where
    F: Fn(&FetchRequest) -> Outcome<V>,
{
    type Value = V;

    fn fetch(&self, request: &FetchRequest) -> Outcome<V> {
        (self.0)(request)
    }
}
