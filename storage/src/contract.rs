//! Behaviour every backend must share, exercised by each backend's tests.

use std::{sync::Arc, thread};

use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};

use crate::{Clock, ManualClock, Storage};

pub fn epoch() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

/// `storage` must be open, empty and driven by `clock`, which must read
/// [`epoch`].
pub fn check<S>(storage: &S, clock: &ManualClock)
where
    S: Storage<Value = String>,
{
    let key = "http://localhost/feed";

    // absent
    assert!(storage.get(key).unwrap().is_none());

    // set stamps with the current time
    storage.set(key, Some("first".into())).unwrap();
    let record = storage.get(key).unwrap().unwrap();
    assert_eq!(record.updated_at, epoch());
    assert_eq!(record.value.as_deref(), Some("first"));

    // set replaces
    clock.advance(Duration::seconds(10));
    storage.set(key, Some("second".into())).unwrap();
    let record = storage.get(key).unwrap().unwrap();
    assert_eq!(record.updated_at, epoch() + Duration::seconds(10));
    assert_eq!(record.value.as_deref(), Some("second"));

    // mark_updated moves the timestamp only
    clock.advance(Duration::seconds(10));
    storage.mark_updated(key).unwrap();
    let record = storage.get(key).unwrap().unwrap();
    assert_eq!(record.updated_at, epoch() + Duration::seconds(20));
    assert_eq!(record.value.as_deref(), Some("second"));
    assert_eq!(record.age(epoch() + Duration::seconds(25)), Duration::seconds(5));

    // mark_updated on a missing key leaves an empty record behind
    let missing = "http://localhost/missing";
    storage.mark_updated(missing).unwrap();
    let record = storage.get(missing).unwrap().unwrap();
    assert_eq!(record.updated_at, epoch() + Duration::seconds(20));
    assert!(record.value.is_none());

    // keys are independent
    assert_eq!(
        storage.get(key).unwrap().unwrap().value.as_deref(),
        Some("second")
    );
}

type Hook = Box<dyn FnOnce() + Send>;

/// A [`ManualClock`] that runs a one-shot hook on its next reading.
pub struct HookedClock {
    clock: ManualClock,
    hook: Mutex<Option<Hook>>,
}

impl HookedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            clock: ManualClock::new(now),
            hook: Mutex::new(None),
        }
    }

    pub fn arm(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }
}

impl Clock for HookedClock {
    fn now(&self) -> OffsetDateTime {
        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        self.clock.now()
    }
}

/// A `set` from another thread landing while `mark_updated` reads the clock
/// must survive the re-stamp.
pub fn check_mark_updated_race<S>(storage: Arc<S>, clock: &HookedClock)
where
    S: Storage<Value = String> + Send + Sync + 'static,
{
    storage.set("k", Some("A".into())).unwrap();

    let writer = Arc::clone(&storage);
    clock.arm(move || {
        thread::spawn(move || writer.set("k", Some("B".into())).unwrap())
            .join()
            .unwrap();
    });
    storage.mark_updated("k").unwrap();

    let record = storage.get("k").unwrap().unwrap();
    assert_eq!(record.value.as_deref(), Some("B"));
    assert_eq!(record.updated_at, epoch());
}
