use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("storage lock poisoned")]
    Poisoned,
}
