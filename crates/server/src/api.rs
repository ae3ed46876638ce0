//! HTTP surface: router construction and request handlers.
//!
//! Every handler gates on [`crate::auth::authorize`] before touching state.
//! A stealth-blocked origin gets an empty 200 from the gate and the handler
//! body never runs. Query handlers render internal error detail because the
//! caller has already proven the admin credential; the heartbeat handler
//! never does.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;

use pulse_core::{
    parse_group_list, resolve_window, DeviceView, Heartbeat, OutputFormat, ValidationError,
};

use crate::auth::{authorize, Access, Scope};
use crate::config::ServerConfig;
use crate::db::Database;
use crate::encode;
use crate::error::ApiError;

pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

pub type SharedState = Arc<AppState>;

// ============================================================
// Router
// ============================================================

pub fn build_router(state: SharedState) -> Router {
    // Per-method fallbacks fold wrong-method requests into the same 400 as
    // unknown paths; callers never see a 404/405 distinction.
    Router::new()
        .route("/heartbeat", post(heartbeat).fallback(bad_request))
        .route("/count", get(count).fallback(bad_request))
        .route("/list", get(list).fallback(bad_request))
        .route("/metrics", get(metrics).fallback(bad_request))
        .fallback(bad_request)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

async fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "bad request" })),
    )
        .into_response()
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

// ============================================================
// Ingestion
// ============================================================

#[derive(Debug, Deserialize)]
struct HeartbeatParams {
    uid: Option<String>,
    part: Option<String>,
    fw: Option<String>,
    sw: Option<String>,
    ciq: Option<String>,
    lang: Option<String>,
    feat: Option<String>,
}

/// POST /heartbeat - idempotent device check-in
async fn heartbeat(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<HeartbeatParams>,
) -> Response {
    match authorize(&state.config, &headers, addr.ip(), Scope::Client) {
        Ok(Access::Granted) => {}
        Ok(Access::StealthBlocked) => return StatusCode::OK.into_response(),
        Err(err) => return err.into_response_with_detail(false),
    }

    match record_heartbeat(&state, &headers, params) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => err.into_response_with_detail(false),
    }
}

fn record_heartbeat(
    state: &AppState,
    headers: &HeaderMap,
    params: HeartbeatParams,
) -> Result<(), ApiError> {
    let unique_id = params
        .uid
        .ok_or(ValidationError::MissingParameter("uid"))?;
    let part_num = params
        .part
        .ok_or(ValidationError::MissingParameter("part"))?;

    // Country comes from the trusted edge header, never from the caller's
    // query string.
    let country = headers
        .get(&state.config.country_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let hb = Heartbeat {
        unique_id,
        part_num,
        fw_version: params.fw,
        sw_version: params.sw,
        ciq_version: params.ciq,
        lang: params.lang,
        feat: params.feat,
        country,
    };

    state.db.upsert_heartbeat(&hb, now_secs())?;
    tracing::debug!(uid = %hb.unique_id, "heartbeat recorded");
    Ok(())
}

// ============================================================
// Query engine
// ============================================================

#[derive(Debug, Deserialize)]
struct QueryParams {
    window: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetricsParams {
    window: Option<String>,
    format: Option<String>,
    groups: Option<String>,
    group: Option<String>,
}

/// GET /count - active devices within the window
async fn count(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> Response {
    match authorize(&state.config, &headers, addr.ip(), Scope::Admin) {
        Ok(Access::Granted) => {}
        Ok(Access::StealthBlocked) => return StatusCode::OK.into_response(),
        Err(err) => return err.into_response_with_detail(false),
    }

    run_count(&state, params).unwrap_or_else(|err| err.into_response_with_detail(true))
}

fn run_count(state: &AppState, params: QueryParams) -> Result<Response, ApiError> {
    let format = OutputFormat::parse(params.format.as_deref())?;
    let window = resolve_window(params.window.as_deref());
    let now = now_secs();
    let active = state.db.count_active(now - window)?;
    Ok(encode::count_response(format, now, window, active))
}

/// GET /list - active devices, newest first
async fn list(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> Response {
    match authorize(&state.config, &headers, addr.ip(), Scope::Admin) {
        Ok(Access::Granted) => {}
        Ok(Access::StealthBlocked) => return StatusCode::OK.into_response(),
        Err(err) => return err.into_response_with_detail(false),
    }

    run_list(&state, params).unwrap_or_else(|err| err.into_response_with_detail(true))
}

fn run_list(state: &AppState, params: QueryParams) -> Result<Response, ApiError> {
    let format = OutputFormat::parse(params.format.as_deref())?;
    let window = resolve_window(params.window.as_deref());
    let records = state.db.list_active(now_secs() - window)?;
    let views: Vec<DeviceView> = records.iter().map(DeviceView::from).collect();
    Ok(encode::list_response(format, window, &views))
}

/// GET /metrics - grouped device counts within the window
async fn metrics(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<MetricsParams>,
) -> Response {
    match authorize(&state.config, &headers, addr.ip(), Scope::Admin) {
        Ok(Access::Granted) => {}
        Ok(Access::StealthBlocked) => return StatusCode::OK.into_response(),
        Err(err) => return err.into_response_with_detail(false),
    }

    run_metrics(&state, params).unwrap_or_else(|err| err.into_response_with_detail(true))
}

fn run_metrics(state: &AppState, params: MetricsParams) -> Result<Response, ApiError> {
    let format = OutputFormat::parse(params.format.as_deref())?;
    let window = resolve_window(params.window.as_deref());
    // `groups` wins when both spellings are present
    let raw_groups = params.groups.or(params.group);
    let keys = parse_group_list(raw_groups.as_deref())?;

    let now = now_secs();
    let buckets = state.db.group_counts(now - window, &keys)?;
    Ok(encode::metrics_response(format, now, window, &keys, &buckets))
}
