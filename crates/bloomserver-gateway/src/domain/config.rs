//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::{Host, Url};

/// Default listen address
pub const DEFAULT_LISTEN_ADDRESS: &str = "tcp://127.0.0.1:14519";

/// Default maximum request body, 4 KiB
pub const DEFAULT_MAX_REQUEST_BODY_LENGTH: usize = 4096;

/// Default per-request scan budget
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 5_000;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse listen address {address:?}: {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("unsupported protocol {scheme:?} in listen address {address:?}")]
    UnsupportedScheme { scheme: String, address: String },

    #[error("could not determine an IP address for {host:?}")]
    UnresolvableHost { host: String },

    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Where to listen: `tcp://host:port`, `tcp4://…`, `tcp6://…` or `unix:///path`
    pub listen_address: String,
    /// Largest accepted request body in bytes
    pub max_request_body_length: usize,
    /// Wall-clock budget for a single scan, counted from the start of handling
    pub scan_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            max_request_body_length: DEFAULT_MAX_REQUEST_BODY_LENGTH,
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    /// Validate limits and timeouts. The listen address is checked by
    /// [`GatewayConfig::resolve_listen_address`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_body_length == 0 {
            return Err(ConfigError::InvalidLimit(
                "maximum request body length cannot be zero".into(),
            ));
        }

        if self.scan_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "scan timeout cannot be zero".into(),
            ));
        }

        Ok(())
    }

    /// Parse and resolve the configured listen address
    pub fn resolve_listen_address(&self) -> Result<ListenAddress, ConfigError> {
        ListenAddress::parse(&self.listen_address)
    }

    /// Scan budget as a duration
    pub fn scan_budget(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}

/// Address family requested by a `tcp*` scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TcpFamily {
    Any,
    V4,
    V6,
}

impl TcpFamily {
    fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            TcpFamily::Any => true,
            TcpFamily::V4 => ip.is_ipv4(),
            TcpFamily::V6 => ip.is_ipv6(),
        }
    }
}

/// A resolved listen target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddress {
    /// TCP socket on a single IP
    Tcp(SocketAddr),
    /// Unix domain socket at a filesystem path
    Unix(PathBuf),
}

impl ListenAddress {
    /// Parse a listen URL, resolving host names to one IP address
    ///
    /// `tcp` takes the first resolved address of any family, `tcp4` and
    /// `tcp6` the first of their family.
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidListenAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(address).map_err(|e| invalid(&e.to_string()))?;
        let family = match url.scheme() {
            "tcp" => TcpFamily::Any,
            "tcp4" => TcpFamily::V4,
            "tcp6" => TcpFamily::V6,
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(invalid("missing socket path"));
                }
                return Ok(ListenAddress::Unix(PathBuf::from(path)));
            }
            scheme => {
                return Err(ConfigError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    address: address.to_string(),
                })
            }
        };

        let port = url.port().ok_or_else(|| invalid("missing port"))?;
        let ip = match url.host().ok_or_else(|| invalid("missing host"))? {
            Host::Ipv4(ip) => IpAddr::V4(ip),
            Host::Ipv6(ip) => IpAddr::V6(ip),
            Host::Domain(name) => match name.parse::<IpAddr>() {
                Ok(ip) => ip,
                Err(_) => resolve_host(name, port, family)?,
            },
        };

        if !family.accepts(&ip) {
            return Err(invalid("address family does not match protocol"));
        }

        Ok(ListenAddress::Tcp(SocketAddr::new(ip, port)))
    }

    /// Network name, as used in log lines
    pub fn network(&self) -> &'static str {
        match self {
            ListenAddress::Tcp(addr) if addr.is_ipv4() => "tcp4",
            ListenAddress::Tcp(_) => "tcp6",
            ListenAddress::Unix(_) => "unix",
        }
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenAddress::Tcp(addr) => write!(f, "tcp://{}", addr),
            ListenAddress::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

fn resolve_host(name: &str, port: u16, family: TcpFamily) -> Result<IpAddr, ConfigError> {
    let unresolvable = || ConfigError::UnresolvableHost {
        host: name.to_string(),
    };

    (name, port)
        .to_socket_addrs()
        .map_err(|_| unresolvable())?
        .map(|addr| addr.ip())
        .find(|ip| family.accepts(ip))
        .ok_or_else(unresolvable)
}
