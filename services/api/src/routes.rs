use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use coaching_ai::error::AppError;
use coaching_ai::workflows::coaching::{
    coaching_router, CoachingSubmissionService, Mailer, SheetStore, TextOracle,
};
use coaching_ai::workflows::dashboard::{DashboardReport, TrendDashboardService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_coaching_routes<O, S, M, D>(
    submissions: Arc<CoachingSubmissionService<O, S, M>>,
    dashboard: Arc<TrendDashboardService<O, S, D>>,
) -> axum::Router
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
    D: SheetStore + ?Sized + 'static,
{
    let dashboard_routes = axum::Router::new()
        .route(
            "/api/v1/coaching/dashboard",
            axum::routing::post(dashboard_endpoint::<O, S, D>),
        )
        .with_state(dashboard);

    coaching_router(submissions)
        .merge(dashboard_routes)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn dashboard_endpoint<O, S, D>(
    State(service): State<Arc<TrendDashboardService<O, S, D>>>,
) -> Result<Json<DashboardReport>, AppError>
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    D: SheetStore + ?Sized + 'static,
{
    let report = service.regenerate().await?;
    Ok(Json(report))
}
