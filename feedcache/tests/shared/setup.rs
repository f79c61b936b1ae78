use std::sync::{Arc, Once};

use feedcache::{CacheOpts, DashStorage, FeedCache, Fetch, ManualClock, ParsedFeed};
use time::{Duration, OffsetDateTime};
use tracing_subscriber::EnvFilter;

pub type Feed = Arc<ParsedFeed>;

pub const USER_AGENT: &str = "feedcache.test";

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn epoch() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp")
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(epoch()))
}

pub fn opts(ttl_seconds: i64) -> CacheOpts {
    CacheOpts {
        ttl: Duration::seconds(ttl_seconds),
        user_agent: USER_AGENT.to_owned(),
    }
}

/// An in-memory cache whose storage and ttl checks both run on `clock`.
pub fn memory_cache<F>(
    fetcher: F,
    ttl_seconds: i64,
    clock: &Arc<ManualClock>,
) -> FeedCache<DashStorage<Feed>, F>
where
    F: Fetch<Value = Feed>,
{
    init_tracing();
    FeedCache::new(
        DashStorage::with_clock(clock.clone()),
        fetcher,
        opts(ttl_seconds),
    )
    .with_clock(clock.clone())
}
