use crate::catalog::{Catalog, CatalogEntry, Node};
use crate::config::{AbsolutePaths, CatalogConfig};
use crate::entry::{parent_path, EntryKind, EntryMeta, ROOT};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, trace};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

/// Permission bits given to directories the archive never lists explicitly.
const SYNTHESIZED_DIR_PERMISSIONS: u32 = 0o755;

/// Largest buffer reserved up front from a header's declared size.
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// An entry seen during the scan. `content` is `None` for directories.
#[derive(Debug)]
struct Pending {
    meta: EntryMeta,
    content: Option<Vec<u8>>,
}

/// Builder that consumes archive entries one at a time and produces a
/// [`Catalog`].
///
/// Parent directories missing from the stream are synthesized as entries are
/// added. Child lists are resolved in [`finish`](Self::finish), since a
/// directory's own entry may arrive before or after its children.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    config: CatalogConfig,
    entries: HashMap<String, Pending>,
    children: HashMap<String, Vec<String>>,
    content_bytes: u64,
}

impl CatalogBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder with the given configuration.
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add one entry, draining `content` into an owned buffer.
    ///
    /// `meta.path()` is the name as stored in the archive; it is normalized
    /// before insertion. For directories the content is drained and dropped.
    pub fn add_entry<R: Read>(&mut self, mut meta: EntryMeta, content: R) -> Result<()> {
        let path = normalize_path(meta.path(), self.config.absolute_paths)?;
        meta.set_path(path.clone());

        let replaced = match self.entries.get(&path) {
            Some(Pending {
                content: Some(old), ..
            }) => old.len() as u64,
            _ => 0,
        };
        let content = self.drain(&meta, content, replaced)?;
        trace!("add_entry({:?}, {:?}, {} bytes)", path, meta.kind(), meta.size());

        if path == ROOT {
            if !meta.is_dir() {
                return Err(Error::InvalidPath(path));
            }
            self.entries.insert(path, Pending { meta, content: None });
            return Ok(());
        }

        match self.entries.get(&path).map(|p| p.meta.kind()) {
            Some(EntryKind::Directory) => {
                if !meta.is_dir() {
                    return Err(Error::IsADirectory(path));
                }
                // Already listed in its parent when it was synthesized.
                if let Some(existing) = self.entries.get_mut(&path) {
                    existing.meta = meta;
                }
            }
            Some(EntryKind::File) => {
                if meta.is_dir() {
                    return Err(Error::NotADirectory(path));
                }
                debug!("Replacing earlier entry for {}", path);
                if let Some(existing) = self.entries.get_mut(&path) {
                    let old_len = existing.content.as_ref().map_or(0, |c| c.len() as u64);
                    self.content_bytes -= old_len;
                    existing.meta = meta;
                    existing.content = content;
                }
            }
            None => {
                let parent = parent_path(&path).to_string();
                self.ensure_dir(&parent, meta.modified())?;
                self.children.entry(parent).or_default().push(path.clone());
                self.entries.insert(path, Pending { meta, content });
            }
        }

        Ok(())
    }

    /// Attach child lists and freeze the catalog.
    pub fn finish(mut self) -> Catalog {
        if !self.entries.contains_key(ROOT) {
            self.entries.insert(
                ROOT.to_string(),
                Pending {
                    meta: EntryMeta::directory(
                        ROOT,
                        SYNTHESIZED_DIR_PERMISSIONS,
                        DateTime::<Utc>::UNIX_EPOCH,
                    ),
                    content: None,
                },
            );
        }

        let listings: HashMap<String, Arc<[EntryMeta]>> = self
            .children
            .iter()
            .map(|(dir, paths)| {
                let metas: Vec<EntryMeta> = paths
                    .iter()
                    .filter_map(|p| self.entries.get(p).map(|e| e.meta.clone()))
                    .collect();
                (dir.clone(), Arc::from(metas))
            })
            .collect();

        let entries: HashMap<String, CatalogEntry> = self
            .entries
            .into_iter()
            .map(|(path, pending)| {
                let node = match pending.content {
                    Some(content) => Node::File {
                        content: Arc::from(content),
                    },
                    None => Node::Directory {
                        children: listings
                            .get(&path)
                            .cloned()
                            .unwrap_or_else(|| Arc::from(Vec::new())),
                    },
                };
                (path, CatalogEntry::new(pending.meta, node))
            })
            .collect();

        info!(
            "Catalog built: {} entries, {} content bytes",
            entries.len(),
            self.content_bytes
        );
        Catalog::new(entries, self.content_bytes)
    }

    /// Read the entry's content, enforcing its declared size and the
    /// configured memory limit. `replaced` is the length of an earlier file
    /// this entry supersedes.
    fn drain<R: Read>(
        &mut self,
        meta: &EntryMeta,
        mut content: R,
        replaced: u64,
    ) -> Result<Option<Vec<u8>>> {
        if meta.is_dir() {
            std::io::copy(&mut content, &mut std::io::sink())?;
            return Ok(None);
        }

        let expected = meta.size();
        if let Some(limit) = self.config.max_total_bytes {
            let retained = self.content_bytes - replaced;
            if retained.saturating_add(expected) > limit {
                return Err(Error::TooLarge { limit });
            }
        }

        // The declared size is untrusted; let the buffer grow as bytes arrive.
        let mut buf = Vec::with_capacity(expected.min(PREALLOC_LIMIT) as usize);
        content.take(expected.saturating_add(1)).read_to_end(&mut buf)?;
        let actual = buf.len() as u64;
        if actual != expected {
            return Err(Error::Truncated {
                path: meta.path().to_string(),
                expected,
                actual,
            });
        }

        self.content_bytes += actual;
        Ok(Some(buf))
    }

    /// Make sure `path` exists as a directory, synthesizing it and its
    /// ancestors if the archive has not listed them yet.
    fn ensure_dir(&mut self, path: &str, modified: DateTime<Utc>) -> Result<()> {
        let mut missing = Vec::new();
        let mut current = path;
        loop {
            match self.entries.get(current) {
                Some(p) if p.meta.is_dir() => break,
                Some(_) => return Err(Error::NotADirectory(current.to_string())),
                None => {
                    missing.push(current.to_string());
                    if current == ROOT {
                        break;
                    }
                    current = parent_path(current);
                }
            }
        }

        // Outermost first, so each directory is listed after its parent exists.
        for dir in missing.into_iter().rev() {
            if dir != ROOT {
                self.children
                    .entry(parent_path(&dir).to_string())
                    .or_default()
                    .push(dir.clone());
            }

            trace!("Synthesizing directory {}", dir);
            let meta = EntryMeta::directory(dir.as_str(), SYNTHESIZED_DIR_PERMISSIONS, modified);
            self.entries.insert(dir, Pending { meta, content: None });
        }
        Ok(())
    }
}

/// Turn a stored entry name into a catalog key.
///
/// Drops `./` prefixes, empty and `.` segments and trailing slashes; rejects
/// `..`. Names that reduce to nothing designate the root.
pub fn normalize_path(name: &str, absolute: AbsolutePaths) -> Result<String> {
    let mut rest = name;
    if rest.starts_with('/') {
        match absolute {
            AbsolutePaths::Reject => return Err(Error::InvalidPath(name.to_string())),
            AbsolutePaths::Strip => rest = rest.trim_start_matches('/'),
        }
    }

    let mut segments = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Error::InvalidPath(name.to_string())),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        Ok(ROOT.to_string())
    } else {
        Ok(segments.join("/"))
    }
}
