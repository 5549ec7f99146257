//! Command envelope client.

use crate::bootstrap::ChannelHandle;
use crate::proto::CommandRequest;
use crate::transport::{CommandTransport, GrpcTransport, TransportError};
use edge_gateway_core::{
    CommandEnvelope, CommandResult, DecodeError, HealthResult, ModuleHealth, decode_structured,
    non_empty,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Failure of a dispatch below the business layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote replied with data that is not valid JSON.
    #[error("protocol violation: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    /// Stable code reported to HTTP callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "CLIENT_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Encode(_) => "ENCODE_ERROR",
        }
    }
}

/// Builds envelopes, sends them, decodes replies.
///
/// Interprets only transport and decode failures. A reply with
/// `success: false` is returned as-is.
#[derive(Clone)]
pub struct EnvelopeClient {
    transport: Arc<dyn CommandTransport>,
}

impl EnvelopeClient {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        Self { transport }
    }

    /// Client over the bootstrapped gRPC channel.
    pub fn from_handle(handle: &ChannelHandle) -> Self {
        Self::new(Arc::new(GrpcTransport::new(handle.channel.clone())))
    }

    /// Dispatch one command. `params` of `None` sends `{}`.
    pub async fn dispatch(
        &self,
        subsystem: &str,
        action: &str,
        params: Option<&Value>,
    ) -> Result<CommandResult, ClientError> {
        let envelope = CommandEnvelope::new(subsystem, action, params)?;
        let started = Instant::now();

        let reply = self
            .transport
            .handle_request(CommandRequest {
                module: envelope.subsystem,
                action: envelope.action,
                payload: envelope.payload,
            })
            .await
            .inspect_err(|e| tracing::warn!(subsystem, action, error = %e, "dispatch failed"))?;

        tracing::debug!(
            subsystem,
            action,
            success = reply.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatch complete"
        );

        Ok(CommandResult {
            success: reply.success,
            data: decode_structured("data", &reply.data)?,
            error: non_empty(reply.error),
            timestamp: reply.timestamp,
        })
    }

    /// Probe the remote's modules. Details decode per module.
    pub async fn health_check(&self) -> Result<HealthResult, ClientError> {
        let reply = self.transport.health_check().await?;
        let modules = reply
            .modules
            .into_iter()
            .map(|m| ModuleHealth::decode(m.name, m.up, &m.details))
            .collect::<Vec<_>>();

        for module in modules.iter().filter(|m| m.details_failed()) {
            tracing::warn!(module = %module.name, "module reported malformed details");
        }

        Ok(HealthResult {
            healthy: reply.healthy,
            modules,
            timestamp: reply.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{CommandResponse, HealthCheckResponse, ModuleStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records requests and answers from a closure.
    struct FakeTransport {
        seen: Mutex<Vec<CommandRequest>>,
        reply: Box<dyn Fn(&CommandRequest) -> Result<CommandResponse, TransportError> + Send + Sync>,
        health: HealthCheckResponse,
    }

    impl FakeTransport {
        fn replying<F>(reply: F) -> Arc<Self>
        where
            F: Fn(&CommandRequest) -> Result<CommandResponse, TransportError> + Send + Sync + 'static,
        {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                reply: Box::new(reply),
                health: HealthCheckResponse::default(),
            })
        }

        fn with_data(data: &str) -> Arc<Self> {
            let data = data.to_string();
            Self::replying(move |_| {
                Ok(CommandResponse {
                    success: true,
                    data: data.clone(),
                    error: String::new(),
                    timestamp: "2026-01-01T00:00:00Z".into(),
                })
            })
        }
    }

    #[async_trait]
    impl CommandTransport for FakeTransport {
        async fn handle_request(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            (self.reply)(&request)
        }

        async fn health_check(&self) -> Result<HealthCheckResponse, TransportError> {
            Ok(self.health.clone())
        }
    }

    #[tokio::test]
    async fn payload_round_trips_params() {
        let transport = FakeTransport::with_data("");
        let client = EnvelopeClient::new(transport.clone());
        let params = json!({"bands": [{"bandwidth": 0, "frequency": 120, "gain": -2.5}]});

        client.dispatch("audio", "set-input-eq", Some(&params)).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].module, "audio");
        assert_eq!(seen[0].action, "set-input-eq");
        let sent: Value = serde_json::from_str(&seen[0].payload).unwrap();
        assert_eq!(sent, params);
    }

    #[tokio::test]
    async fn omitted_params_send_empty_object() {
        let transport = FakeTransport::with_data("");
        let client = EnvelopeClient::new(transport.clone());

        client.dispatch("command-control", "get-datetime", None).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        let sent: Value = serde_json::from_str(&seen[0].payload).unwrap();
        assert_eq!(sent, json!({}));
    }

    #[tokio::test]
    async fn absent_data_is_none() {
        let client = EnvelopeClient::new(FakeTransport::with_data(""));
        let result = client.dispatch("camera", "get-device", None).await.unwrap();
        assert!(result.success);
        assert_eq!(result.data, None);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn data_is_decoded() {
        let client = EnvelopeClient::new(FakeTransport::with_data(r#"{"peopleNum": 3}"#));
        let result = client.dispatch("camera", "get-room-state", None).await.unwrap();
        assert_eq!(result.data, Some(json!({"peopleNum": 3})));
    }

    #[tokio::test]
    async fn malformed_data_is_an_error() {
        let client = EnvelopeClient::new(FakeTransport::with_data("{peopleNum: 3"));
        let err = client.dispatch("camera", "get-room-state", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(err.code(), "DECODE_ERROR");
    }

    #[tokio::test]
    async fn business_failure_passes_through() {
        let client = EnvelopeClient::new(FakeTransport::replying(|_| {
            Ok(CommandResponse {
                success: false,
                data: String::new(),
                error: "device busy".into(),
                timestamp: "t".into(),
            })
        }));
        let result = client.dispatch("command-control", "system-reboot", None).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("device busy"));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = FakeTransport::replying(|_| Err(TransportError::new("Unavailable", "connection refused")));
        let client = EnvelopeClient::new(transport.clone());
        let err = client.dispatch("command-control", "scan-wifi", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(err.code(), "CLIENT_ERROR");
        // No retry.
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn health_check_isolates_bad_module() {
        let transport = Arc::new(FakeTransport {
            seen: Mutex::new(Vec::new()),
            reply: Box::new(|_: &CommandRequest| Err(TransportError::new("Unimplemented", "unused"))),
            health: HealthCheckResponse {
                healthy: true,
                modules: vec![
                    ModuleStatus {
                        name: "audio".into(),
                        up: true,
                        details: r#"{"cards": 2}"#.into(),
                    },
                    ModuleStatus {
                        name: "camera".into(),
                        up: true,
                        details: "{broken".into(),
                    },
                    ModuleStatus {
                        name: "network".into(),
                        up: false,
                        details: r#"["eth0"]"#.into(),
                    },
                ],
                timestamp: "t".into(),
            },
        });
        let client = EnvelopeClient::new(transport);

        let health = client.health_check().await.unwrap();
        assert_eq!(health.modules.len(), 3);
        assert_eq!(health.modules[0].details, Some(json!({"cards": 2})));
        assert!(!health.modules[0].details_failed());
        assert!(health.modules[1].details_failed());
        assert_eq!(health.modules[1].details, None);
        assert_eq!(health.modules[2].details, Some(json!(["eth0"])));
        assert!(!health.modules[2].up);
    }

    /// Echoes the request payload back as data after a payload-dependent delay,
    /// so replies complete out of order.
    struct EchoTransport;

    #[async_trait]
    impl CommandTransport for EchoTransport {
        async fn handle_request(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
            let params: Value = serde_json::from_str(&request.payload).unwrap();
            let n = params["n"].as_u64().unwrap();
            tokio::time::sleep(Duration::from_millis((16 - n % 16) * 2)).await;
            Ok(CommandResponse {
                success: true,
                data: json!({"n": n, "action": request.action}).to_string(),
                error: String::new(),
                timestamp: n.to_string(),
            })
        }

        async fn health_check(&self) -> Result<HealthCheckResponse, TransportError> {
            Ok(HealthCheckResponse::default())
        }
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_not_cross_delivered() {
        let client = EnvelopeClient::new(Arc::new(EchoTransport));

        let tasks: Vec<_> = (0..32u64)
            .map(|n| {
                let client = client.clone();
                tokio::spawn(async move {
                    let action = format!("action-{n}");
                    let result = client
                        .dispatch("command-control", &action, Some(&json!({"n": n})))
                        .await
                        .unwrap();
                    (n, action, result)
                })
            })
            .collect();

        for task in tasks {
            let (n, action, result) = task.await.unwrap();
            assert_eq!(result.data, Some(json!({"n": n, "action": action})));
            assert_eq!(result.timestamp, n.to_string());
        }
    }
}
