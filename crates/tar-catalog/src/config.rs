/// How entry names starting with `/` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsolutePaths {
    /// Fail the build with [`crate::Error::InvalidPath`].
    #[default]
    Reject,
    /// Drop the leading slashes and keep the entry.
    Strip,
}

/// Configuration for building a catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Policy for absolute entry names.
    pub absolute_paths: AbsolutePaths,
    /// Upper bound on the total content retained in memory, if any.
    pub max_total_bytes: Option<u64>,
}
