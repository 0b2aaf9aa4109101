use crate::error::{FsError, Result};
use log::trace;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use tar_catalog::{Catalog, EntryMeta, Node};

/// A filesystem that can be opened by path.
///
/// This is the contract static-content servers consume: open, then
/// stat/read/seek/list through the returned file.
pub trait FileSystem {
    type File: File;

    /// Open `path` for reading.
    fn open(&self, path: &str) -> Result<Self::File>;
}

/// An open file or directory.
pub trait File: Read + Seek {
    /// Release the file. Never fails.
    fn close(&mut self) -> io::Result<()>;

    /// Metadata of the opened entry.
    fn stat(&self) -> &EntryMeta;

    /// List children from the current cursor position.
    ///
    /// With `count <= 0` every remaining child is returned and the listing
    /// never reports end of stream. With `count > 0` at most `count` children
    /// are returned, and `end_of_stream` is set on the call that drains the
    /// listing. Calls at or past the end return an empty batch without the
    /// flag.
    fn read_dir(&mut self, count: isize) -> ReadDir;
}

/// One batch of directory children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadDir {
    pub entries: Vec<EntryMeta>,
    /// No children remain after this batch.
    pub end_of_stream: bool,
}

/// Read-only filesystem over a shared [`Catalog`].
///
/// Cloning is cheap; all clones and every handle they open share the same
/// immutable catalog.
#[derive(Debug, Clone)]
pub struct TarFileSystem {
    catalog: Arc<Catalog>,
}

impl TarFileSystem {
    pub fn new(catalog: Catalog) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    pub fn from_shared(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl From<Catalog> for TarFileSystem {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}

impl FileSystem for TarFileSystem {
    type File = Handle;

    fn open(&self, path: &str) -> Result<Handle> {
        trace!("open({:?})", path);

        let entry = self
            .catalog
            .get(path)
            .ok_or_else(|| FsError::not_found("open", path))?;

        let (content, children) = match entry.node() {
            Node::File { content } => (Arc::clone(content), empty_children()),
            Node::Directory { children } => (empty_content(), Arc::clone(children)),
        };

        Ok(Handle {
            meta: Arc::clone(entry.shared_meta()),
            content,
            position: 0,
            children,
            cursor: 0,
        })
    }
}

fn empty_content() -> Arc<[u8]> {
    Arc::from(Vec::new())
}

fn empty_children() -> Arc<[EntryMeta]> {
    Arc::from(Vec::new())
}

/// Per-open view of one catalog entry.
///
/// The content and child list are shared with the catalog; the read position
/// and listing cursor belong to this handle alone.
#[derive(Debug)]
pub struct Handle {
    meta: Arc<EntryMeta>,
    content: Arc<[u8]>,
    position: u64,
    children: Arc<[EntryMeta]>,
    cursor: usize,
}

impl Handle {
    /// Current read position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Entire content of the entry, independent of the read position.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.content.len() as u64;
        if self.position >= len {
            return Ok(0);
        }

        let start = self.position as usize;
        let n = buf.len().min(self.content.len() - start);
        buf[..n].copy_from_slice(&self.content[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for Handle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.content.len() as i128;
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::End(n) => len + n as i128,
            SeekFrom::Current(n) => self.position as i128 + n as i128,
        };

        if target < 0 || target > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {} outside 0..={}", target, len),
            ));
        }

        self.position = target as u64;
        Ok(self.position)
    }
}

impl File for Handle {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn stat(&self) -> &EntryMeta {
        &self.meta
    }

    fn read_dir(&mut self, count: isize) -> ReadDir {
        let start = self.cursor.min(self.children.len());
        let remaining = self.children.len() - start;

        if count <= 0 {
            self.cursor = self.children.len();
            return ReadDir {
                entries: self.children[start..].to_vec(),
                end_of_stream: false,
            };
        }

        if remaining == 0 {
            return ReadDir::default();
        }

        let take = remaining.min(count as usize);
        self.cursor = start + take;
        ReadDir {
            entries: self.children[start..self.cursor].to_vec(),
            end_of_stream: self.cursor == self.children.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn handle_with_children(names: &[&str]) -> Handle {
        let children: Vec<EntryMeta> = names
            .iter()
            .map(|n| EntryMeta::file(*n, 10, 0o666, DateTime::<Utc>::UNIX_EPOCH))
            .collect();
        Handle {
            meta: Arc::new(EntryMeta::directory(".", 0o755, DateTime::<Utc>::UNIX_EPOCH)),
            content: empty_content(),
            position: 0,
            children: Arc::from(children),
            cursor: 0,
        }
    }

    fn names(batch: &ReadDir) -> Vec<&str> {
        batch.entries.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn read_dir_non_positive_returns_everything() {
        let mut dir = handle_with_children(&["foo", "bar", "baz"]);

        let all = dir.read_dir(-1);
        assert_eq!(names(&all), vec!["foo", "bar", "baz"]);
        assert!(!all.end_of_stream);

        let again = dir.read_dir(0);
        assert!(again.entries.is_empty());
        assert!(!again.end_of_stream);
    }

    #[test]
    fn read_dir_positive_pages_and_signals_once() {
        let mut dir = handle_with_children(&["foo", "bar", "baz"]);

        let first = dir.read_dir(1);
        assert_eq!(names(&first), vec!["foo"]);
        assert!(!first.end_of_stream);

        let rest = dir.read_dir(3);
        assert_eq!(names(&rest), vec!["bar", "baz"]);
        assert!(rest.end_of_stream);

        let after = dir.read_dir(1);
        assert!(after.entries.is_empty());
        assert!(!after.end_of_stream);
    }

    #[test]
    fn read_dir_one_at_a_time() {
        let mut dir = handle_with_children(&["foo", "bar", "baz"]);

        for (i, expected) in ["foo", "bar", "baz"].iter().enumerate() {
            let batch = dir.read_dir(1);
            assert_eq!(names(&batch), vec![*expected]);
            assert_eq!(batch.end_of_stream, i == 2);
        }
        assert_eq!(dir.read_dir(1), ReadDir::default());
    }

    #[test]
    fn read_dir_on_empty_directory() {
        let mut dir = handle_with_children(&[]);
        assert_eq!(dir.read_dir(5), ReadDir::default());
        assert_eq!(dir.read_dir(-1), ReadDir::default());
    }

    #[test]
    fn close_always_succeeds() {
        let mut dir = handle_with_children(&["foo"]);
        assert!(dir.close().is_ok());
        assert!(dir.close().is_ok());
    }
}
