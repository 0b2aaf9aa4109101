//! WebDAV filesystem implementation for tar catalogs.
//!
//! This module implements the `dav_server::fs::DavFileSystem` trait on top
//! of [`TarFileSystem`], mapping catalog entries to WebDAV resources.

use crate::vfs::{File, FileSystem, Handle, TarFileSystem};
use dav_server::davpath::DavPath;
use dav_server::fs::{
    DavDirEntry, DavFile, DavFileSystem, DavMetaData, FsError, FsFuture, FsStream, OpenOptions,
    ReadDirMeta,
};
use futures::stream;
use log::{debug, trace};
use std::io::{Read, Seek, SeekFrom};
use std::time::SystemTime;
use tar_catalog::{EntryMeta, ROOT};

/// WebDAV filesystem adapter for tar catalogs.
///
/// Every request opens a fresh [`Handle`], so concurrent requests never
/// share a read position or listing cursor.
#[derive(Clone)]
pub struct TarDavFs {
    fs: TarFileSystem,
}

impl TarDavFs {
    pub fn new(fs: TarFileSystem) -> Self {
        Self { fs }
    }

    /// Open the catalog entry behind a request path.
    fn open_handle(&self, path: &DavPath) -> Result<Handle, FsError> {
        let key = catalog_key(path);
        self.fs.open(&key).map_err(|err| {
            trace!("{}", err);
            FsError::NotFound
        })
    }
}

/// Map a request path to a catalog key: slashes trimmed, empty is the root.
fn catalog_key(path: &DavPath) -> String {
    let rel = path.as_rel_ospath().to_string_lossy().into_owned();
    let trimmed = rel.trim_matches('/');
    if trimmed.is_empty() {
        ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

impl DavFileSystem for TarDavFs {
    fn open<'a>(&'a self, path: &'a DavPath, options: OpenOptions) -> FsFuture<'a, Box<dyn DavFile>> {
        trace!("open({:?}, {:?})", path, options);

        let result = (|| {
            // Read-only filesystem
            if options.write
                || options.append
                || options.create
                || options.create_new
                || options.truncate
            {
                return Err(FsError::Forbidden);
            }

            let handle = self.open_handle(path)?;
            Ok(Box::new(TarDavFile { handle }) as Box<dyn DavFile>)
        })();

        Box::pin(async move { result })
    }

    fn read_dir<'a>(
        &'a self,
        path: &'a DavPath,
        meta: ReadDirMeta,
    ) -> FsFuture<'a, FsStream<Box<dyn DavDirEntry>>> {
        trace!("read_dir({:?}, {:?})", path, meta);

        let result = (|| {
            let mut handle = self.open_handle(path)?;
            if !handle.stat().is_dir() {
                return Err(FsError::Forbidden);
            }

            let entries: Vec<Box<dyn DavDirEntry>> = handle
                .read_dir(0)
                .entries
                .into_iter()
                .map(|meta| Box::new(TarDavDirEntry { meta }) as Box<dyn DavDirEntry>)
                .collect();

            debug!("read_dir: returning {} entries", entries.len());

            let stream = stream::iter(entries.into_iter().map(Ok));
            Ok(Box::pin(stream) as FsStream<Box<dyn DavDirEntry>>)
        })();

        Box::pin(async move { result })
    }

    fn metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        trace!("metadata({:?})", path);

        let result = self
            .open_handle(path)
            .map(|handle| Box::new(TarDavMetaData::from(handle.stat())) as Box<dyn DavMetaData>);

        Box::pin(async move { result })
    }
}

/// WebDAV file backed by an in-memory handle.
#[derive(Debug)]
struct TarDavFile {
    handle: Handle,
}

impl DavFile for TarDavFile {
    fn metadata(&mut self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = TarDavMetaData::from(self.handle.stat());
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }

    fn read_bytes(&mut self, count: usize) -> FsFuture<'_, bytes::Bytes> {
        let mut buffer = vec![0u8; count];
        let result = self.handle.read(&mut buffer).map(|n| {
            buffer.truncate(n);
            bytes::Bytes::from(buffer)
        });

        Box::pin(async move { result.map_err(|_| FsError::GeneralFailure) })
    }

    fn seek(&mut self, pos: SeekFrom) -> FsFuture<'_, u64> {
        let result = self.handle.seek(pos).map_err(|_| FsError::GeneralFailure);
        Box::pin(async move { result })
    }

    fn write_buf(&mut self, _buf: Box<dyn bytes::Buf + Send>) -> FsFuture<'_, ()> {
        // Read-only filesystem
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn write_bytes(&mut self, _buf: bytes::Bytes) -> FsFuture<'_, ()> {
        // Read-only filesystem
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn flush(&mut self) -> FsFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// WebDAV directory entry.
struct TarDavDirEntry {
    meta: EntryMeta,
}

impl DavDirEntry for TarDavDirEntry {
    fn name(&self) -> Vec<u8> {
        self.meta.name().as_bytes().to_vec()
    }

    fn metadata(&self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = TarDavMetaData::from(&self.meta);
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }
}

/// WebDAV metadata for files and directories.
#[derive(Clone, Debug)]
struct TarDavMetaData {
    is_dir: bool,
    len: u64,
    modified: SystemTime,
}

impl From<&EntryMeta> for TarDavMetaData {
    fn from(meta: &EntryMeta) -> Self {
        Self {
            is_dir: meta.is_dir(),
            len: meta.size(),
            modified: SystemTime::from(meta.modified()),
        }
    }
}

impl DavMetaData for TarDavMetaData {
    fn len(&self) -> u64 {
        self.len
    }

    fn modified(&self) -> Result<SystemTime, FsError> {
        Ok(self.modified)
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn created(&self) -> Result<SystemTime, FsError> {
        Ok(self.modified)
    }
}
