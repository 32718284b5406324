/// Errors that can occur in the data package store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a cache file failed.
    #[error("cache i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A cache file did not hold a valid game payload.
    #[error("cache payload invalid: {0}")]
    Json(#[from] serde_json::Error),

    /// The (game, checksum) pair does not map to a usable cache path.
    /// This also covers checksums that sanitization would alter, which
    /// would let textually-clashing checksums pollute each other.
    #[error("no valid cache path for game {0:?}")]
    InvalidPath(String),
}
