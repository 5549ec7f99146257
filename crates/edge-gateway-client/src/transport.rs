//! The seam between envelope handling and the wire.

use crate::proto::{
    CommandRequest, CommandResponse, EdgeServiceClient, HealthCheckRequest, HealthCheckResponse,
};
use async_trait::async_trait;
use tonic::transport::Channel;

/// The remote could not be reached or the exchange failed below the
/// application layer (refused, deadline exceeded, channel error).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct TransportError {
    pub code: String,
    pub message: String,
}

impl TransportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        Self::new(format!("{:?}", status.code()), status.message())
    }
}

/// One request/response exchange per call. Implementations must allow
/// concurrent calls from many tasks.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn handle_request(&self, request: CommandRequest) -> Result<CommandResponse, TransportError>;

    async fn health_check(&self) -> Result<HealthCheckResponse, TransportError>;
}

/// gRPC transport over a shared tonic channel.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    client: EdgeServiceClient,
}

impl GrpcTransport {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: EdgeServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl CommandTransport for GrpcTransport {
    async fn handle_request(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
        // Each call drives its own clone; the channel multiplexes them.
        let mut client = self.client.clone();
        let response = client.handle_request(request).await?;
        Ok(response.into_inner())
    }

    async fn health_check(&self) -> Result<HealthCheckResponse, TransportError> {
        let mut client = self.client.clone();
        let response = client.health_check(HealthCheckRequest {}).await?;
        Ok(response.into_inner())
    }
}
