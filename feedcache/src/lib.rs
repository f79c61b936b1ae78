mod cache;
mod feed;
mod fetch;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod parse;

pub use cache::{CacheOpts, FeedCache};
pub use feed::{Enclosure, FeedEntry, FeedMeta, ParsedFeed};
pub use fetch::{FeedContent, Fetch, FetchFn, FetchRequest, Outcome, fetch_fn};
#[cfg(feature = "http")]
pub use http::{FetchError, HttpFetcher, HttpFetcherBuilder};

#[cfg(feature = "file")]
pub use storage::FileStorage;
pub use storage::{
    CacheRecord, Clock, DashStorage, ManualClock, Opened, Storage, StorageError, SystemClock,
};
