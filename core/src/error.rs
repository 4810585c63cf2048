pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported index format version {found} (expected {expected}); rebuild the index")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("corrupt index: {0}")]
    Corrupt(String),

    #[error("no index in memory; build or load one first")]
    NoIndex,
}
