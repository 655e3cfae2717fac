use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use leakpath_core::{BlockId, GridSpec, ShipGrid};
use serde::Serialize;
use serde_json::json;
use tracing::{info, info_span};

use crate::errors::AppError;
use crate::host::ShipHost;
use crate::models::{state_name, DoorRequest, StartRequest};

#[derive(Clone)]
pub struct AppState {
    pub host: Arc<ShipHost>,
}

#[derive(Debug, Serialize)]
pub struct Healthz { pub status: &'static str }

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/version", get(version))
        .route("/grid", get(get_grid).put(put_grid))
        .route("/blocks/:id/door", post(set_door))
        .route("/leak", get(get_leak))
        .route("/leak/start", post(start_leak))
        .route("/leak/cancel", post(cancel_leak))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(Healthz { status: "ok" }))
}

async fn version() -> impl IntoResponse {
    let svc_version = env!("CARGO_PKG_VERSION");
    let core_version = leakpath_core::version();
    (StatusCode::OK, Json(json!({"service_version": svc_version, "core_version": core_version})))
}

async fn get_grid(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.host.summary()))
}

async fn put_grid(State(state): State<AppState>, Json(spec): Json<GridSpec>) -> Result<impl IntoResponse, AppError> {
    let span = info_span!("put_grid", name = %spec.name);
    let _enter = span.enter();
    let grid = ShipGrid::from_spec(spec)?;
    state.host.replace_grid(grid);
    Ok((StatusCode::OK, Json(state.host.summary())))
}

async fn set_door(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<DoorRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !(0.0..=1.0).contains(&req.closed_ratio) {
        return Err(AppError::BadRequest(format!("closed_ratio must be within 0..=1, got {}", req.closed_ratio)));
    }
    state.host.set_door(BlockId(id), req.closed_ratio)?;
    Ok((StatusCode::OK, Json(json!({"block": id, "closed_ratio": req.closed_ratio}))))
}

async fn start_leak(State(state): State<AppState>, Json(req): Json<StartRequest>) -> impl IntoResponse {
    let s = state.host.start_search(req.start);
    info!(start = %req.start, state = state_name(s), "leak search requested");
    (StatusCode::ACCEPTED, Json(state.host.report()))
}

async fn cancel_leak(State(state): State<AppState>) -> impl IntoResponse {
    state.host.cancel_search();
    (StatusCode::OK, Json(state.host.report()))
}

async fn get_leak(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.host.report()))
}
