use std::io;
use thiserror::Error;

/// Errors returned by the filesystem view.
#[derive(Debug, Error)]
pub enum FsError {
    /// The requested path is not in the catalog.
    #[error("{op} {path}: file does not exist")]
    NotFound { op: &'static str, path: String },
}

impl FsError {
    pub(crate) fn not_found(op: &'static str, path: &str) -> Self {
        FsError::NotFound {
            op,
            path: path.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    /// Path the failed operation was called with.
    pub fn path(&self) -> &str {
        match self {
            FsError::NotFound { path, .. } => path,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match err {
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
        };
        io::Error::new(kind, err)
    }
}

/// Result type for tar-fs operations.
pub type Result<T> = std::result::Result<T, FsError>;
