//! Relay request handlers.
//!
//! [`relay`] is the router fallback: every request that is not `/health`
//! lands here and is forwarded to the upstream API.

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use super::request::RelayRequest;
use super::routes::ForwardMode;
use super::server::GatewayState;
use crate::error::GatewayError;
use crate::traits::UpstreamRequest;

/// Liveness probe. Never touches the upstream API.
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Forward one caller request to the upstream API.
pub async fn relay(
    State(state): State<GatewayState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("relay", %request_id, %method);

    async move {
        match forward(&state, method, query, &headers, body).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn forward(
    state: &GatewayState,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    // Preflights carrying CORS request headers are answered by the CORS layer.
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let token = state
        .auth
        .bearer_token()
        .await
        .map_err(GatewayError::CredentialSource)?
        .ok_or(GatewayError::MissingCredential)?;

    let Query(pairs) = query.map_err(|e| GatewayError::InvalidQuery(e.body_text()))?;
    let request = RelayRequest::from_parts(method, headers, pairs)?;

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| GatewayError::RequestBody(e.to_string()))?;

    let mode = state.routes.mode_for(&request.path, &request.method);
    let path = request.path.clone();
    let upstream_request = request.with_body(body).into_upstream(&state.target, &token)?;

    tracing::debug!(%path, %mode, url = %upstream_request.url, "Forwarding to upstream");

    match mode {
        ForwardMode::Buffered => relay_buffered(state, &path, upstream_request).await,
        ForwardMode::Streaming => relay_streaming(state, &path, upstream_request).await,
    }
}

async fn relay_buffered(
    state: &GatewayState,
    path: &str,
    request: UpstreamRequest,
) -> Result<Response, GatewayError> {
    let upstream = state.upstream.send(request).await?;
    let status = upstream_status(upstream.status)?;

    tracing::info!(path, mode = "buffered", status = upstream.status, "Relayed");

    if upstream.body.is_empty() {
        return Ok(status.into_response());
    }

    let value: Value = upstream
        .json()
        .map_err(|e| GatewayError::InvalidUpstreamJson(e.to_string()))?;
    Ok((status, Json(value)).into_response())
}

async fn relay_streaming(
    state: &GatewayState,
    path: &str,
    request: UpstreamRequest,
) -> Result<Response, GatewayError> {
    let upstream = state.upstream.send_streaming(request).await?;
    let status = upstream_status(upstream.status)?;

    tracing::info!(path, mode = "streaming", status = upstream.status, "Relaying stream");

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, ForwardMode::Streaming.content_type())
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(upstream.body))
        .map_err(|e| GatewayError::ResponseBuild(e.to_string()))
}

fn upstream_status(status: u16) -> Result<StatusCode, GatewayError> {
    StatusCode::from_u16(status)
        .map_err(|e| GatewayError::ResponseBuild(format!("upstream status {status}: {e}")))
}
