//! tar-serve: Serve a tar archive as a static site without extracting it.
//!
//! The archive (plain or gzip-compressed) is read into memory once and then
//! served read-only over HTTP/WebDAV.
//!
//! # Usage
//!
//! ```bash
//! tar-serve website.tar.gz --port 8080 --autoindex
//!
//! # Then browse to http://localhost:8080/
//! ```

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use tar_fs::webdav::{self, ServeConfig};
use tar_fs::{open_archive, AbsolutePaths, CatalogConfig, File, FileSystem, TarFileSystem};

/// Serve a tar archive over HTTP without extracting it.
#[derive(Parser, Debug)]
#[command(name = "tar-serve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the .tar or .tar.gz archive
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Accept entries with absolute names by stripping the leading slash
    #[arg(long)]
    strip_absolute: bool,

    /// Refuse archives whose content exceeds this many bytes
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<u64>,

    /// Render HTML listings for directories
    #[arg(long)]
    autoindex: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    if !args.archive.is_file() {
        error!("Archive not found: {}", args.archive.display());
        process::exit(1);
    }

    let config = CatalogConfig {
        absolute_paths: if args.strip_absolute {
            AbsolutePaths::Strip
        } else {
            AbsolutePaths::Reject
        },
        max_total_bytes: args.max_bytes,
    };

    let catalog = match open_archive(&args.archive, config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to read archive: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Entries: {} ({} bytes of content)",
        catalog.len(),
        catalog.content_bytes()
    );

    let fs = TarFileSystem::new(catalog);
    if let Ok(mut root) = fs.open(".") {
        for child in root.read_dir(0).entries {
            let suffix = if child.is_dir() { "/" } else { "" };
            info!("  - {}{} ({} bytes)", child.name(), suffix, child.size());
        }
    }

    let serve_config = ServeConfig {
        port: args.port,
        autoindex: args.autoindex,
        ..ServeConfig::default()
    };
    if let Err(e) = webdav::serve(fs, serve_config).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
