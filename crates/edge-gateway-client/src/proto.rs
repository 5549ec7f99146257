//! Wire messages and gRPC stub for `edge.EdgeService`.
//!
//! Written out by hand in the shape prost/tonic generate, so the crate builds
//! without `protoc`. Field tags must match the remote's `edge.proto`.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

const SERVICE: &str = "edge.EdgeService";

#[derive(Clone, PartialEq, prost::Message)]
pub struct CommandRequest {
    #[prost(string, tag = "1")]
    pub module: String,
    #[prost(string, tag = "2")]
    pub action: String,
    /// JSON text.
    #[prost(string, tag = "3")]
    pub payload: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CommandResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    /// JSON text, empty when absent.
    #[prost(string, tag = "2")]
    pub data: String,
    #[prost(string, tag = "3")]
    pub error: String,
    #[prost(string, tag = "4")]
    pub timestamp: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthCheckRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ModuleStatus {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub up: bool,
    /// JSON text, empty when absent.
    #[prost(string, tag = "3")]
    pub details: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthCheckResponse {
    #[prost(bool, tag = "1")]
    pub healthy: bool,
    #[prost(message, repeated, tag = "2")]
    pub modules: Vec<ModuleStatus>,
    #[prost(string, tag = "3")]
    pub timestamp: String,
}

/// Unary client for the two service methods.
///
/// Cloning is cheap and clones share the underlying HTTP/2 connection.
#[derive(Debug, Clone)]
pub struct EdgeServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl EdgeServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    pub async fn handle_request(
        &mut self,
        request: CommandRequest,
    ) -> Result<tonic::Response<CommandResponse>, tonic::Status> {
        self.unary(request, "HandleRequest").await
    }

    pub async fn health_check(
        &mut self,
        request: HealthCheckRequest,
    ) -> Result<tonic::Response<HealthCheckResponse>, tonic::Status> {
        self.unary(request, "HealthCheck").await
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: Req,
        method: &'static str,
    ) -> Result<tonic::Response<Resp>, tonic::Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {e}")))?;

        let path = PathAndQuery::try_from(format!("/{SERVICE}/{method}"))
            .map_err(|e| tonic::Status::internal(format!("invalid method path: {e}")))?;
        let mut request = tonic::Request::new(request);
        request
            .extensions_mut()
            .insert(tonic::GrpcMethod::new(SERVICE, method));

        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        self.inner.unary(request, path, codec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn command_request_wire_round_trip() {
        let request = CommandRequest {
            module: "camera".into(),
            action: "set-mode".into(),
            payload: r#"{"mode":1}"#.into(),
        };
        let bytes = request.encode_to_vec();
        assert_eq!(CommandRequest::decode(bytes.as_slice()).unwrap(), request);
    }

    #[test]
    fn empty_strings_are_proto3_defaults() {
        let reply = CommandResponse::decode(&[][..]).unwrap();
        assert!(!reply.success);
        assert!(reply.data.is_empty());
        assert!(reply.error.is_empty());
    }
}
