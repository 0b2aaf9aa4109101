//! # tar-catalog
//!
//! One-pass scanner that turns a tar stream into an immutable, path-indexed
//! in-memory catalog.
//!
//! This crate provides:
//! - Entry metadata (`EntryMeta`) and path normalization
//! - `CatalogBuilder`, which drains every entry into memory and synthesizes
//!   directory listings the archive does not carry explicitly
//! - `Catalog`, the frozen result, safe to share between threads
//! - Tar readers for plain and gzip-compressed archives
//!
//! ## Example
//!
//! ```ignore
//! use tar_catalog::{open_archive, CatalogConfig};
//!
//! let catalog = open_archive("website.tar.gz", CatalogConfig::default())?;
//! let root = catalog.root();
//!
//! for child in root.children().unwrap().iter() {
//!     println!("{} ({} bytes)", child.name(), child.size());
//! }
//! ```

mod builder;
mod catalog;
mod config;
mod entry;
mod error;
mod source;

pub use builder::{normalize_path, CatalogBuilder};
pub use catalog::{Catalog, CatalogEntry, Node};
pub use config::{AbsolutePaths, CatalogConfig};
pub use entry::{base_name, parent_path, EntryKind, EntryMeta, ROOT};
pub use error::{Error, Result};
pub use source::{open_archive, read_tar};
