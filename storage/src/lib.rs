mod clock;
#[cfg(test)]
mod contract;
mod dashstorage;
mod error;
#[cfg(feature = "file")]
mod filestorage;
mod record;
mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dashstorage::DashStorage;
pub use error::StorageError;
#[cfg(feature = "file")]
pub use filestorage::FileStorage;
pub use record::CacheRecord;
pub use storage::{Opened, Storage};
