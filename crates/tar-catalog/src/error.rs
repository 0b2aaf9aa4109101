use thiserror::Error;

/// Errors that can occur while building a catalog from an archive stream.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O or framing error surfaced by the archive stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry name could not be turned into a catalog key.
    #[error("invalid entry path: {0}")]
    InvalidPath(String),

    /// A file entry is named as the parent of another entry.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A file entry uses a path that is already a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// An entry's content did not match its declared size.
    #[error("truncated entry {path}: expected {expected} bytes, got {actual}")]
    Truncated {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// Retained content exceeded the configured limit.
    #[error("archive content exceeds limit of {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Result type for tar-catalog operations.
pub type Result<T> = std::result::Result<T, Error>;
