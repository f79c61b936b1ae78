#[cfg(feature = "file")]
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage used before it was opened")]
    NotOpen,

    #[error("storage io failure :: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "file")]
    #[error("cannot encode record for `{key}` :: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "file")]
    #[error("storage file `{}` is corrupt :: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
