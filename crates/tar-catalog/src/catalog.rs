use crate::entry::{EntryMeta, ROOT};
use std::collections::HashMap;
use std::sync::Arc;

/// Payload of a catalog entry.
#[derive(Debug, Clone)]
pub enum Node {
    /// File content, fully materialized.
    File { content: Arc<[u8]> },
    /// Direct children in archive-scan order.
    Directory { children: Arc<[EntryMeta]> },
}

/// One path in the catalog: metadata plus its file content or child list.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    meta: Arc<EntryMeta>,
    node: Node,
}

impl CatalogEntry {
    pub(crate) fn new(meta: EntryMeta, node: Node) -> Self {
        Self {
            meta: Arc::new(meta),
            node,
        }
    }

    pub fn meta(&self) -> &EntryMeta {
        &self.meta
    }

    /// Metadata as a shared pointer, for handles that outlive the borrow.
    pub fn shared_meta(&self) -> &Arc<EntryMeta> {
        &self.meta
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// File content, or `None` for directories.
    pub fn content(&self) -> Option<&Arc<[u8]>> {
        match &self.node {
            Node::File { content } => Some(content),
            Node::Directory { .. } => None,
        }
    }

    /// Child metadata, or `None` for files.
    pub fn children(&self) -> Option<&Arc<[EntryMeta]>> {
        match &self.node {
            Node::File { .. } => None,
            Node::Directory { children } => Some(children),
        }
    }
}

/// Immutable, path-indexed view of an archive.
///
/// Keys are normalized paths without leading or trailing slashes; the root
/// is `"."`. Lookups are exact string matches.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    content_bytes: u64,
}

impl Catalog {
    pub(crate) fn new(entries: HashMap<String, CatalogEntry>, content_bytes: u64) -> Self {
        Self {
            entries,
            content_bytes,
        }
    }

    /// Find an entry by its exact key.
    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// The root directory entry.
    pub fn root(&self) -> &CatalogEntry {
        // The builder always inserts the root.
        &self.entries[ROOT]
    }

    /// All keys, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries, including synthesized directories and the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes of file content held by the catalog.
    pub fn content_bytes(&self) -> u64 {
        self.content_bytes
    }
}
