//! Listening sockets: TCP or Unix domain.

use std::io;
use std::net::SocketAddr;
#[cfg(unix)]
use std::path::PathBuf;

use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tracing::{debug, info};

use crate::domain::{GatewayError, ListenAddress};

/// A bound listener, ready to be handed to `QueryGatewayService::serve`
#[derive(Debug)]
pub enum GatewayListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix {
        listener: UnixListener,
        path: PathBuf,
    },
}

impl GatewayListener {
    /// Bind the given address. A stale Unix socket file is removed first.
    pub async fn bind(address: &ListenAddress) -> Result<Self, GatewayError> {
        let bind_error = |source: io::Error| GatewayError::Bind {
            address: address.to_string(),
            source,
        };

        let listener = match address {
            ListenAddress::Tcp(addr) => {
                GatewayListener::Tcp(TcpListener::bind(addr).await.map_err(bind_error)?)
            }
            #[cfg(unix)]
            ListenAddress::Unix(path) => {
                match std::fs::remove_file(path) {
                    Ok(()) => debug!(path = %path.display(), "removed stale socket"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(bind_error(e)),
                }
                GatewayListener::Unix {
                    listener: UnixListener::bind(path).map_err(bind_error)?,
                    path: path.clone(),
                }
            }
            #[cfg(not(unix))]
            ListenAddress::Unix(_) => {
                return Err(bind_error(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix sockets are not available on this platform",
                )))
            }
        };

        info!(network = address.network(), address = %address, "listening");
        Ok(listener)
    }

    /// Bound TCP address, `None` for Unix sockets
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            GatewayListener::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            GatewayListener::Unix { .. } => None,
        }
    }
}
