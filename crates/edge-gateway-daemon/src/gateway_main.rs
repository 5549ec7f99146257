//! Edge gateway daemon.
//!
//! Serves the device-control REST surface and forwards every call to the edge
//! service as a command envelope.
//!
//! Run:
//!   cargo run -p edge-gateway-daemon -- --port 3001 --rpc-addr localhost:50051
//!
//! Then:
//!   curl localhost:3001/health
//!   curl localhost:3001/api/device/get-device-info
//!   curl -X POST localhost:3001/api/audio/set-speaker-volume \
//!     -H 'content-type: application/json' -d '{"volume": 40}'

mod config;
mod error;
mod server;

use clap::Parser;
use config::{Args, Config};
use edge_gateway_client::EnvelopeClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("edge_gateway=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args)?;

    // Fatal on unreadable TLS material: nothing is served without a channel.
    let (handle, security) = edge_gateway_client::bootstrap(&config.bootstrap())?;
    tracing::info!(
        enabled = security.enabled,
        certs_found = security.certs_found,
        missing = ?security.missing_certs,
        "channel security resolved"
    );

    let client = EnvelopeClient::from_handle(&handle);
    server::run(config.server.port, server::AppState::new(client, security)).await
}
