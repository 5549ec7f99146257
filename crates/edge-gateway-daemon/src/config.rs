//! Gateway configuration: defaults, then an optional TOML file, then flags
//! and environment.

use anyhow::Context;
use clap::Parser;
use edge_gateway_client::BootstrapConfig;
use edge_gateway_client::bootstrap::{DEFAULT_CERTS_DIR, DEFAULT_ENDPOINT, MTLS_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Parser, Debug, Default)]
#[command(name = "edge-gateway")]
#[command(about = "HTTP gateway for edge device control over gRPC", long_about = None)]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "EDGE_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP listen port
    #[arg(short, long, env = "EDGE_GATEWAY_PORT")]
    pub port: Option<u16>,

    /// Edge service address (host:port)
    #[arg(long, env = "EDGE_RPC_ADDR")]
    pub rpc_addr: Option<String>,

    /// TLS server name to verify when it differs from the address host
    #[arg(long, env = "EDGE_TLS_DOMAIN")]
    pub tls_domain: Option<String>,

    /// Directory holding ca.crt, client.crt and client.key
    #[arg(long, env = "EDGE_CERTS_DIR")]
    pub certs_dir: Option<PathBuf>,

    /// Mutual TLS preference; false/0/no/off/disabled turns it off
    #[arg(long, env = MTLS_ENV)]
    pub mtls: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Edge service address
    pub address: String,

    /// TLS server name override
    pub tls_domain: Option<String>,

    /// Security material directory
    pub certs_dir: PathBuf,

    /// Mutual TLS preference (raw, as it would appear in the environment)
    pub mtls: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rpc: RpcConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ENDPOINT.to_string(),
            tls_domain: None,
            certs_dir: PathBuf::from(DEFAULT_CERTS_DIR),
            mtls: None,
        }
    }
}

impl Config {
    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Resolve the layered configuration.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(addr) = &args.rpc_addr {
            self.rpc.address = addr.clone();
        }
        if let Some(domain) = &args.tls_domain {
            self.rpc.tls_domain = Some(domain.clone());
        }
        if let Some(dir) = &args.certs_dir {
            self.rpc.certs_dir = dir.clone();
        }
        if let Some(mtls) = &args.mtls {
            self.rpc.mtls = Some(mtls.clone());
        }
    }

    pub fn bootstrap(&self) -> BootstrapConfig {
        BootstrapConfig {
            mtls_setting: self.rpc.mtls.clone(),
            certs_dir: self.rpc.certs_dir.clone(),
            endpoint: self.rpc.address.clone(),
            tls_domain: self.rpc.tls_domain.clone(),
        }
    }
}
