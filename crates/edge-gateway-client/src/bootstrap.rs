//! Channel bootstrap: choose mutual TLS or a plaintext channel, once.
//!
//! This is the only place that probes the filesystem for security material
//! and the only place that decides the authentication mode. The decision is
//! returned as an immutable [`ChannelSecurityStatus`] alongside the handle.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};

pub const DEFAULT_CERTS_DIR: &str = "certs";
pub const DEFAULT_ENDPOINT: &str = "localhost:50051";
pub const MTLS_ENV: &str = "EDGE_MTLS";

pub const CA_CERT: &str = "ca.crt";
pub const CLIENT_CERT: &str = "client.crt";
pub const CLIENT_KEY: &str = "client.key";

/// Required material, in probe order.
pub const REQUIRED_MATERIAL: [&str; 3] = [CA_CERT, CLIENT_CERT, CLIENT_KEY];

/// Flag values that explicitly turn mutual TLS off.
const DISABLE_VALUES: &[&str] = &["false", "0", "no", "off", "disabled"];

/// Inputs to the bootstrap decision.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Raw value of the security flag, `None` when unset.
    pub mtls_setting: Option<String>,
    pub certs_dir: PathBuf,
    /// `host:port`, optionally with an `http://` or `https://` scheme.
    pub endpoint: String,
    /// Overrides the TLS server name (defaults to the endpoint host).
    pub tls_domain: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            mtls_setting: None,
            certs_dir: PathBuf::from(DEFAULT_CERTS_DIR),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tls_domain: None,
        }
    }
}

/// Outcome of the bootstrap decision, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSecurityStatus {
    /// Mutual TLS in use.
    pub enabled: bool,
    /// All three material files present.
    pub certs_found: bool,
    /// Raw flag value, empty when unset.
    pub env_setting: String,
    pub certs_dir: PathBuf,
    pub missing_certs: Vec<String>,
}

impl ChannelSecurityStatus {
    /// The flag explicitly turned authentication off.
    pub fn disabled_by_setting(&self) -> bool {
        setting_disables(&self.env_setting)
    }

    /// Authentication was wanted but material was incomplete.
    pub fn degraded(&self) -> bool {
        !self.enabled && !self.disabled_by_setting()
    }
}

/// An established (lazily connected) channel plus the mode it runs in.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    pub channel: Channel,
    pub uri: String,
    pub authenticated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to read {}: {source}", path.display())]
    ReadMaterial {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RPC endpoint {uri}: {source}")]
    Endpoint {
        uri: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("invalid TLS material: {0}")]
    Tls(#[source] tonic::transport::Error),
}

fn setting_disables(setting: &str) -> bool {
    let setting = setting.trim().to_ascii_lowercase();
    DISABLE_VALUES.contains(&setting.as_str())
}

/// Decide the security mode from the flag and the material on disk.
pub fn probe(config: &BootstrapConfig) -> ChannelSecurityStatus {
    let env_setting = config.mtls_setting.clone().unwrap_or_default();
    let missing_certs: Vec<String> = REQUIRED_MATERIAL
        .iter()
        .filter(|name| !config.certs_dir.join(name).exists())
        .map(|name| name.to_string())
        .collect();
    let certs_found = missing_certs.is_empty();
    let enabled = !setting_disables(&env_setting) && certs_found;

    ChannelSecurityStatus {
        enabled,
        certs_found,
        env_setting,
        certs_dir: config.certs_dir.clone(),
        missing_certs,
    }
}

/// Resolve the channel. Call once, before serving traffic.
pub fn bootstrap(
    config: &BootstrapConfig,
) -> Result<(ChannelHandle, ChannelSecurityStatus), BootstrapError> {
    let status = probe(config);
    log_status(&status);

    let handle = if status.enabled {
        let tls = load_tls(&config.certs_dir, config.tls_domain.as_deref())?;
        let uri = endpoint_uri(&config.endpoint, "https");
        let endpoint = endpoint(&uri)?.tls_config(tls).map_err(BootstrapError::Tls)?;
        ChannelHandle {
            channel: endpoint.connect_lazy(),
            uri,
            authenticated: true,
        }
    } else {
        let uri = endpoint_uri(&config.endpoint, "http");
        ChannelHandle {
            channel: endpoint(&uri)?.connect_lazy(),
            uri,
            authenticated: false,
        }
    };

    tracing::info!(
        uri = %handle.uri,
        authenticated = handle.authenticated,
        "RPC channel ready"
    );
    Ok((handle, status))
}

fn log_status(status: &ChannelSecurityStatus) {
    if status.enabled {
        tracing::info!(certs_dir = %status.certs_dir.display(), "mutual TLS enabled");
    } else if status.disabled_by_setting() {
        tracing::warn!(
            setting = %status.env_setting,
            "mutual TLS disabled by {MTLS_ENV}; using an unauthenticated channel"
        );
    } else {
        tracing::warn!(
            certs_dir = %status.certs_dir.display(),
            missing = ?status.missing_certs,
            "mutual TLS material incomplete; falling back to an unauthenticated channel"
        );
    }
}

fn read_material(dir: &Path, name: &str) -> Result<Vec<u8>, BootstrapError> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|source| BootstrapError::ReadMaterial { path, source })
}

fn load_tls(dir: &Path, domain: Option<&str>) -> Result<ClientTlsConfig, BootstrapError> {
    let ca = read_material(dir, CA_CERT)?;
    let cert = read_material(dir, CLIENT_CERT)?;
    let key = read_material(dir, CLIENT_KEY)?;

    let mut tls = ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(ca))
        .identity(Identity::from_pem(cert, key));
    if let Some(domain) = domain {
        tls = tls.domain_name(domain);
    }
    Ok(tls)
}

fn endpoint(uri: &str) -> Result<Endpoint, BootstrapError> {
    Endpoint::from_shared(uri.to_string()).map_err(|source| BootstrapError::Endpoint {
        uri: uri.to_string(),
        source,
    })
}

/// Normalize `address` to carry `scheme`.
fn endpoint_uri(address: &str, scheme: &str) -> String {
    let bare = address
        .strip_prefix("https://")
        .or_else(|| address.strip_prefix("http://"))
        .unwrap_or(address);
    format!("{scheme}://{bare}")
}
