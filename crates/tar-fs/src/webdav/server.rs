//! HTTP server hosting the WebDAV filesystem, using hyper.

use super::TarDavFs;
use crate::vfs::TarFileSystem;
use dav_server::{fakels::FakeLs, DavHandler, DavMethodSet};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use std::convert::Infallible;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to listen on (0 for auto-assign).
    pub port: u16,
    /// Render HTML listings for directory GET requests.
    pub autoindex: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            autoindex: false,
        }
    }
}

/// Handle to a server started with [`serve_background`].
pub struct TarWebDavServer {
    /// Server address.
    addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TarWebDavServer {
    /// Get the server's listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn build_handler(fs: TarFileSystem, config: &ServeConfig) -> DavHandler {
    DavHandler::builder()
        .filesystem(Box::new(TarDavFs::new(fs)))
        .locksystem(FakeLs::new())
        .methods(DavMethodSet::WEBDAV_RO)
        .autoindex(config.autoindex)
        .build_handler()
}

fn serve_connection(dav_server: DavHandler, stream: TcpStream) {
    let io = TokioIo::new(stream);

    tokio::spawn(async move {
        if let Err(err) = http1::Builder::new()
            .serve_connection(
                io,
                service_fn(move |req| {
                    let dav_server = dav_server.clone();
                    async move { Ok::<_, Infallible>(dav_server.handle(req).await) }
                }),
            )
            .await
        {
            error!("Connection error: {:?}", err);
        }
    });
}

/// Serve `fs` and block until the listener fails.
///
/// # Example
///
/// ```ignore
/// use tar_fs::webdav::{serve, ServeConfig};
/// use tar_fs::{open_archive, CatalogConfig, TarFileSystem};
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let catalog = open_archive("website.tar.gz", CatalogConfig::default()).unwrap();
///     serve(TarFileSystem::new(catalog), ServeConfig::default()).await
/// }
/// ```
pub async fn serve(fs: TarFileSystem, config: ServeConfig) -> io::Result<()> {
    let dav_server = build_handler(fs, &config);

    let listener = TcpListener::bind(SocketAddr::new(config.host, config.port)).await?;
    let local_addr = listener.local_addr()?;

    info!("Serving archive on http://{}", local_addr);
    info!("Press Ctrl+C to stop the server");

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        debug!("Connection from {}", remote_addr);
        serve_connection(dav_server.clone(), stream);
    }
}

/// Start serving `fs` in the background.
///
/// Returns a handle that can be used to get the server address and shut it down.
pub async fn serve_background(
    fs: TarFileSystem,
    config: ServeConfig,
) -> io::Result<TarWebDavServer> {
    let dav_server = build_handler(fs, &config);

    let listener = TcpListener::bind(SocketAddr::new(config.host, config.port)).await?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    info!("Server started on http://{}", local_addr);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            debug!("Connection from {}", remote_addr);
                            serve_connection(dav_server.clone(), stream);
                        }
                        Err(e) => {
                            error!("Accept error: {:?}", e);
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Server shutting down");
                    break;
                }
            }
        }
    });

    Ok(TarWebDavServer {
        addr: local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
