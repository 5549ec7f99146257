//! Client side of the edge gateway.
//!
//! [`bootstrap`] resolves the RPC channel once at startup; [`EnvelopeClient`]
//! sends command envelopes over it and decodes the replies.

pub mod bootstrap;
mod client;
pub mod proto;
mod transport;

pub use bootstrap::{
    BootstrapConfig, BootstrapError, ChannelHandle, ChannelSecurityStatus, bootstrap, probe,
};
pub use client::{ClientError, EnvelopeClient};
pub use transport::{CommandTransport, GrpcTransport, TransportError};
