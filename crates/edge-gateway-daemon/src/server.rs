//! Gateway HTTP server (axum).
//!
//! One handler per entry in the route table, plus liveness, remote health,
//! channel diagnostics and the combined camera page.

use crate::error::ApiError;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{MethodRouter, get, post},
};
use chrono::{SecondsFormat, Utc};
use edge_gateway_client::{ChannelSecurityStatus, EnvelopeClient};
use edge_gateway_core::routes::CAMERA;
use edge_gateway_core::{CommandResult, HealthResult, Method, RouteSpec, RouteTable};
use futures_util::future::join_all;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    client: EnvelopeClient,
    security: ChannelSecurityStatus,
}

impl AppState {
    pub fn new(client: EnvelopeClient, security: ChannelSecurityStatus) -> Self {
        Self { client, security }
    }
}

type SharedState = Arc<AppState>;

/// Sections of `GET /api/camera/page-data` and the camera action behind each.
const CAMERA_PAGE: [(&str, &str); 4] = [
    ("deviceInfo", "get-device"),
    ("intelligentVideo", "get-intelligent-video"),
    ("roomState", "get-room-state"),
    ("externalVideo", "get-external-video"),
];

pub async fn run(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(liveness))
        .route("/health/channel", get(channel_status))
        .route("/api/health", get(remote_health))
        .route("/api/camera/page-data", get(camera_page));

    for spec in RouteTable::all() {
        app = app.route(spec.path, route_handler(spec));
    }

    app.layer(middleware::from_fn(log_requests))
        .with_state(Arc::new(state))
}

fn route_handler(spec: &'static RouteSpec) -> MethodRouter<SharedState> {
    let handler = move |State(state): State<SharedState>, body: Bytes| async move {
        dispatch_route(spec, &state, &body).await
    };
    match spec.method {
        Method::Get => get(handler),
        Method::Post => post(handler),
    }
}

/// Validate, dispatch, pass the result through.
async fn dispatch_route(
    spec: &RouteSpec,
    state: &AppState,
    body: &[u8],
) -> Result<Json<CommandResult>, ApiError> {
    let body = match spec.method {
        Method::Get => None,
        Method::Post => parse_body(body)?,
    };
    let params = spec.validate(body.as_ref())?;
    let result = state
        .client
        .dispatch(spec.subsystem, spec.action, Some(&params))
        .await?;
    Ok(Json(result))
}

/// Empty body is no body.
fn parse_body(bytes: &[u8]) -> Result<Option<Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| ApiError::Body(e.to_string()))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /health - gateway liveness, never touches the remote
async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": now() }))
}

/// GET /health/channel - security mode chosen at startup
async fn channel_status(State(state): State<SharedState>) -> Json<ChannelSecurityStatus> {
    Json(state.security.clone())
}

/// GET /api/health - remote module health
async fn remote_health(State(state): State<SharedState>) -> Result<Json<HealthResult>, ApiError> {
    Ok(Json(state.client.health_check().await?))
}

/// GET /api/camera/page-data - everything the camera page needs, in one call
async fn camera_page(State(state): State<SharedState>) -> Result<Json<CommandResult>, ApiError> {
    let calls = CAMERA_PAGE
        .iter()
        .map(|(_, action)| state.client.dispatch(CAMERA, action, None));
    // Every dispatch runs to completion before any failure is reported.
    let results = join_all(calls).await;

    let mut data = Map::new();
    let mut success = true;
    let mut error = None;
    for ((section, _), result) in CAMERA_PAGE.iter().zip(results) {
        let result = result?;
        success &= result.success;
        if error.is_none() {
            error = result.error;
        }
        data.insert(section.to_string(), result.data.unwrap_or(Value::Null));
    }

    Ok(Json(CommandResult {
        success,
        data: Some(Value::Object(data)),
        error,
        timestamp: now(),
    }))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
