use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::intake::SubmissionForm;
use super::mailer::Mailer;
use super::oracle::TextOracle;
use super::service::{CoachingSubmissionService, SubmissionServiceError};
use super::store::{RecordFilter, SheetStore};

/// Router builder exposing the catalog, intake and history endpoints.
pub fn coaching_router<O, S, M>(service: Arc<CoachingSubmissionService<O, S, M>>) -> Router
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/coaching/categories",
            get(categories_handler::<O, S, M>),
        )
        .route(
            "/api/v1/coaching/submissions",
            get(history_handler::<O, S, M>).post(submit_handler::<O, S, M>),
        )
        .with_state(service)
}

pub(crate) async fn categories_handler<O, S, M>(
    State(service): State<Arc<CoachingSubmissionService<O, S, M>>>,
) -> Response
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
{
    let payload = json!({
        "categories": service.catalog().prompts(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<O, S, M>(
    State(service): State<Arc<CoachingSubmissionService<O, S, M>>>,
    axum::Json(form): axum::Json<SubmissionForm>,
) -> Response
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
{
    match service.submit(form).await {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt.view())).into_response(),
        Err(SubmissionServiceError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmissionServiceError::Persistence(error)) => {
            let payload = json!({
                "error": format!("submission was not saved: {error}"),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn history_handler<O, S, M>(
    State(service): State<Arc<CoachingSubmissionService<O, S, M>>>,
    Query(filter): Query<RecordFilter>,
) -> Response
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
{
    match service.history(&filter) {
        Ok(submissions) => {
            let payload = json!({
                "count": submissions.len(),
                "submissions": submissions,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
