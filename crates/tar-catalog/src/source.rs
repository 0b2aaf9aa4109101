//! Tar entry stream feeding the [`CatalogBuilder`].

use crate::builder::CatalogBuilder;
use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::entry::EntryMeta;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tar::EntryType;

/// Leading bytes of a gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Build a catalog from an uncompressed tar stream.
///
/// The stream is read to completion. Any framing or I/O error aborts the
/// build; no partial catalog is returned.
pub fn read_tar<R: Read>(reader: R, config: CatalogConfig) -> Result<Catalog> {
    let mut archive = tar::Archive::new(reader);
    let mut builder = CatalogBuilder::with_config(config);

    for entry in archive.entries()? {
        let entry = entry?;
        let header = entry.header();

        let name = {
            let path = entry.path()?;
            path.to_str()
                .ok_or_else(|| Error::InvalidPath(path.to_string_lossy().to_string()))?
                .to_string()
        };

        let permissions = header.mode()?;
        let modified = DateTime::<Utc>::from_timestamp(header.mtime()? as i64, 0)
            .unwrap_or_default();

        let meta = match header.entry_type() {
            EntryType::Regular | EntryType::Continuous => {
                EntryMeta::file(name, entry.size(), permissions, modified)
            }
            EntryType::Directory => EntryMeta::directory(name, permissions, modified),
            other => {
                debug!("Skipping {:?} entry {}", other, name);
                continue;
            }
        };

        builder.add_entry(meta, entry)?;
    }

    Ok(builder.finish())
}

/// Build a catalog from a tar archive on disk, gunzipping it first when the
/// file starts with the gzip magic.
pub fn open_archive<P: AsRef<Path>>(path: P, config: CatalogConfig) -> Result<Catalog> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    info!(
        "Reading {}archive {}",
        if gzipped { "gzip " } else { "" },
        path.display()
    );

    if gzipped {
        read_tar(GzDecoder::new(reader), config)
    } else {
        read_tar(reader, config)
    }
}
