use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use debtclear::error::AppError;
use debtclear::payoff::{
    AccelerationRequest, ExtraPaymentImpact, PayoffPlan, PlanRequest, PlannerError,
};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;

#[derive(Debug, Serialize)]
pub(crate) struct OptimizeResponse {
    pub(crate) success: bool,
    #[serde(flatten)]
    pub(crate) plan: PayoffPlan,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccelerateResponse {
    pub(crate) success: bool,
    #[serde(flatten)]
    pub(crate) impact: ExtraPaymentImpact,
}

pub(crate) fn planner_routes() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/optimize", post(optimize_endpoint))
        .route("/accelerate", post(accelerate_endpoint))
}

pub(crate) async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "debtclear",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/optimize", "/accelerate", "/health", "/ready", "/metrics"],
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn optimize_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let Json(request) = payload.map_err(malformed_body)?;
    let plan = state.planner.plan(request)?;
    Ok(Json(OptimizeResponse {
        success: true,
        plan,
    }))
}

pub(crate) async fn accelerate_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<AccelerationRequest>, JsonRejection>,
) -> Result<Json<AccelerateResponse>, AppError> {
    let Json(request) = payload.map_err(malformed_body)?;
    let impact = state.planner.accelerate(request)?;
    Ok(Json(AccelerateResponse {
        success: true,
        impact,
    }))
}

fn malformed_body(rejection: JsonRejection) -> AppError {
    AppError::Planner(PlannerError::InvalidInput(rejection.body_text()))
}
