use chrono::{DateTime, Utc};

/// Catalog key of the archive root.
pub const ROOT: &str = ".";

/// Unix type bit for directories.
const S_IFDIR: u32 = 0o040000;
/// Unix type bit for regular files.
const S_IFREG: u32 = 0o100000;

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    fn type_bits(self) -> u32 {
        match self {
            EntryKind::File => S_IFREG,
            EntryKind::Directory => S_IFDIR,
        }
    }
}

/// Metadata of one catalog entry.
///
/// The same value is returned by `stat` on the entry itself and appears in
/// its parent's child listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    path: String,
    kind: EntryKind,
    size: u64,
    permissions: u32,
    modified: DateTime<Utc>,
}

impl EntryMeta {
    /// Metadata for a regular file.
    pub fn file<S: Into<String>>(
        path: S,
        size: u64,
        permissions: u32,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
            permissions: permissions & 0o7777,
            modified,
        }
    }

    /// Metadata for a directory. Directories always report a size of zero.
    pub fn directory<S: Into<String>>(path: S, permissions: u32, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
            permissions: permissions & 0o7777,
            modified,
        }
    }

    /// Full catalog key, e.g. `about/index.html`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path segment, e.g. `index.html`.
    pub fn name(&self) -> &str {
        base_name(&self.path)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Content length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Permission bits combined with the Unix file type bits.
    pub fn mode(&self) -> u32 {
        self.permissions | self.kind.type_bits()
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }
}

/// Parent key of a normalized path; top-level entries belong to [`ROOT`].
pub fn parent_path(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => ROOT,
    }
}

/// Final segment of a normalized path.
pub fn base_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}
