//! Command line configuration.

use std::path::PathBuf;

use bloomserver_gateway::domain::config::{
    DEFAULT_LISTEN_ADDRESS, DEFAULT_MAX_REQUEST_BODY_LENGTH, DEFAULT_SCAN_TIMEOUT_MS,
};
use bloomserver_gateway::GatewayConfig;
use clap::{Args, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "bloomserver", version)]
#[command(about = "Screens request text against a Bloom filter of known words")]
pub struct NodeArgs {
    /// Filter file to serve
    #[arg(long, env = "BLOOMSERVER_FILTER_FILE")]
    pub bloom_filter_file: PathBuf,

    /// Listen address: tcp://host:port, tcp4://…, tcp6://… or unix:///path
    #[arg(long, env = "BLOOMSERVER_LISTEN_ADDRESS", default_value = DEFAULT_LISTEN_ADDRESS)]
    pub listen_address: String,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_BODY_LENGTH)]
    pub http_max_request_body_length: usize,

    /// Per-request scan budget in milliseconds
    #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT_MS)]
    pub scan_timeout_ms: u64,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl NodeArgs {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            listen_address: self.listen_address.clone(),
            max_request_body_length: self.http_max_request_body_length,
            scan_timeout_ms: self.scan_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_gateway_config() {
        let args = NodeArgs::try_parse_from([
            "bloomserver",
            "--bloom-filter-file",
            "words.bloom",
            "--listen-address",
            "unix:///tmp/bloomserver.sock",
            "--http-max-request-body-length",
            "1024",
            "--scan-timeout-ms",
            "250",
            "--log-json",
        ])
        .unwrap();

        let config = args.gateway_config();
        assert_eq!(args.bloom_filter_file, PathBuf::from("words.bloom"));
        assert_eq!(config.listen_address, "unix:///tmp/bloomserver.sock");
        assert_eq!(config.max_request_body_length, 1024);
        assert_eq!(config.scan_timeout_ms, 250);
        assert!(args.log.log_json);
    }

    #[test]
    fn test_rejects_non_numeric_limit() {
        assert!(NodeArgs::try_parse_from([
            "bloomserver",
            "--bloom-filter-file",
            "words.bloom",
            "--http-max-request-body-length",
            "lots",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        NodeArgs::command().debug_assert();
    }
}
