//! # tar-fs
//!
//! Read-only virtual filesystem over tar archives held in memory.
//!
//! This crate provides:
//! - The `FileSystem` / `File` contract: open by path, stat, read, seek and
//!   resumable directory listing
//! - `TarFileSystem`, backed by an immutable [`tar_catalog::Catalog`]
//! - **WebDAV/HTTP server support** (with `webdav` feature)
//!
//! ## Example
//!
//! ```ignore
//! use std::io::Read;
//! use tar_fs::{open_archive, CatalogConfig, File, FileSystem, TarFileSystem};
//!
//! let catalog = open_archive("website.tar.gz", CatalogConfig::default())?;
//! let fs = TarFileSystem::new(catalog);
//!
//! let mut page = fs.open("about/index.html")?;
//! let mut body = String::new();
//! page.read_to_string(&mut body)?;
//!
//! let mut root = fs.open(".")?;
//! for child in root.read_dir(0).entries {
//!     println!("{}", child.name());
//! }
//! ```
//!
//! ## WebDAV Support
//!
//! Enable the `webdav` feature to serve the archive over HTTP. Browsers get
//! plain GET (with ranges) and WebDAV clients can mount it read-only:
//!
//! ```ignore
//! use tar_fs::webdav::{serve, ServeConfig};
//! use tar_fs::{open_archive, CatalogConfig, TarFileSystem};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let catalog = open_archive("website.tar", CatalogConfig::default()).unwrap();
//!     serve(TarFileSystem::new(catalog), ServeConfig::default()).await
//! }
//! ```

mod error;
mod vfs;

#[cfg(feature = "webdav")]
pub mod webdav;

pub use error::{FsError, Result};
pub use vfs::{File, FileSystem, Handle, ReadDir, TarFileSystem};

// Re-export tar-catalog types for convenience
pub use tar_catalog::{
    open_archive, read_tar, AbsolutePaths, Catalog, CatalogConfig, EntryKind, EntryMeta,
};
