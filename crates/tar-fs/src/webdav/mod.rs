//! WebDAV/HTTP server adapter for tar archives.
//!
//! Serves a [`TarFileSystem`](crate::TarFileSystem) over HTTP so that the
//! archive behaves like a static site root: browsers can GET files (including
//! range requests) and WebDAV clients can mount it read-only.
//!
//! # Example
//!
//! ```ignore
//! use tar_fs::webdav::{serve_background, ServeConfig};
//! use tar_fs::{open_archive, CatalogConfig, TarFileSystem};
//!
//! let catalog = open_archive("website.tar.gz", CatalogConfig::default())?;
//! let server = serve_background(TarFileSystem::new(catalog), ServeConfig::default()).await?;
//! println!("Serving at {}", server.url());
//! ```

mod filesystem;
mod server;

pub use filesystem::TarDavFs;
pub use server::{serve, serve_background, ServeConfig, TarWebDavServer};
