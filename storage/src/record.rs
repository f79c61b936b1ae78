use time::{Duration, OffsetDateTime};

/// What a backend keeps per key.
///
/// `updated_at` is when the record was last written, either by a fresh
/// fetch or by a revalidation. It says nothing about when the feed itself
/// changed. A record without a value means "nothing fetched yet".
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord<V> {
    pub updated_at: OffsetDateTime,
    pub value: Option<V>,
}

impl<V> CacheRecord<V> {
    pub fn new(updated_at: OffsetDateTime, value: Option<V>) -> Self {
        Self { updated_at, value }
    }

    /// Negative when `updated_at` lies in the future of `now`.
    #[inline]
    pub fn age(&self, now: OffsetDateTime) -> Duration {
        now - self.updated_at
    }
}
