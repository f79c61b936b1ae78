use std::sync::Arc;

use storage::{CacheRecord, Clock, Storage, StorageError, SystemClock};
use time::Duration;

use crate::{FeedContent, Fetch, FetchRequest, Outcome};

#[derive(Debug, Clone)]
pub struct CacheOpts {
    /// How long a stored feed is served before it is revalidated.
    pub ttl: Duration,
    pub user_agent: String,
}

impl CacheOpts {
    pub const DEFAULT_TTL: Duration = Duration::seconds(300);
    pub const DEFAULT_USER_AGENT: &'static str = "feedcache";
}

impl Default for CacheOpts {
    fn default() -> Self {
        Self {
            ttl: Self::DEFAULT_TTL,
            user_agent: Self::DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Serves feeds out of `storage`, going to `fetcher` only when the stored
/// copy is missing or older than the ttl.
///
/// Lookups block for the duration of any fetch. Concurrent lookups of the
/// same stale key each fetch; whichever writes last wins.
pub struct FeedCache<S, F> {
    storage: S,
    fetcher: F,
    opts: CacheOpts,
    clock: Arc<dyn Clock>,
}

impl<S, F> FeedCache<S, F>
where
    S: Storage,
    S::Value: FeedContent + Clone,
    F: Fetch<Value = S::Value>,
{
    pub fn new(storage: S, fetcher: F, opts: CacheOpts) -> Self {
        Self {
            storage,
            fetcher,
            opts,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to age records. It should be the one the
    /// storage stamps records with.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the feed at `url`.
    ///
    /// Upstream failures are not errors here: they come back as a value
    /// flagged bozo, and the stored copy is left as it was. Only storage
    /// failures are returned as `Err`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", fields(%url), skip_all, err)
    )]
    pub fn lookup(&self, url: &str) -> Result<S::Value, StorageError> {
        let now = self.clock.now();
        let mut request = FetchRequest::new(url, &self.opts.user_agent);

        let cached = match self.storage.get(url)? {
            Some(CacheRecord {
                updated_at,
                value: Some(value),
            }) => {
                let age = now - updated_at;
                if age <= self.opts.ttl {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%age, "cached contents still valid");

                    return Ok(value);
                }

                request = request.revalidating(&value);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    %age,
                    etag = ?request.etag,
                    modified = ?request.modified,
                    "cached contents stale"
                );

                Some(value)
            }
            Some(CacheRecord { value: None, .. }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("record holds no contents; treating as missing");

                None
            }
            None => None,
        };

        match self.fetcher.fetch(&request) {
            Outcome::NotModified(response) => match cached {
                Some(value) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("not modified; refreshing timestamp");

                    self.storage.mark_updated(url)?;
                    Ok(value)
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("not modified, but nothing is stored");

                    Ok(response)
                }
            },
            Outcome::Fresh(content) if !content.is_bozo() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("storing fresh contents");

                self.storage.set(url, Some(content.clone()))?;
                Ok(content)
            }
            Outcome::Fresh(content) | Outcome::Error(content) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("fetch failed; stored record left untouched");

                Ok(content)
            }
        }
    }
}

impl<S, F> FeedCache<S, F> {
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[inline]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[inline]
    pub fn opts(&self) -> &CacheOpts {
        &self.opts
    }
}
