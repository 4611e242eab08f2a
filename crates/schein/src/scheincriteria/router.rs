use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::model::{StudentId, TutorialId};

use super::criteria::CriterionId;
use super::payload::CriterionDto;
use super::repository::{CourseSnapshotSource, CriteriaRepository, RepositoryError};
use super::service::{ScheincriteriaService, ScheincriteriaServiceError};

/// Router builder exposing criteria management and evaluation endpoints.
pub fn scheincriteria_router<R, S>(service: Arc<ScheincriteriaService<R, S>>) -> Router
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/scheincriteria",
            get(list_handler::<R, S>).post(create_handler::<R, S>),
        )
        .route("/api/v1/scheincriteria/form", get(form_handler::<R, S>))
        .route(
            "/api/v1/scheincriteria/student",
            get(all_results_handler::<R, S>),
        )
        .route(
            "/api/v1/scheincriteria/student/:student_id",
            get(student_result_handler::<R, S>),
        )
        .route(
            "/api/v1/scheincriteria/tutorial/:tutorial_id",
            get(tutorial_results_handler::<R, S>),
        )
        .route(
            "/api/v1/scheincriteria/:criterion_id",
            get(fetch_handler::<R, S>)
                .patch(update_handler::<R, S>)
                .delete(delete_handler::<R, S>),
        )
        .route(
            "/api/v1/scheincriteria/:criterion_id/info",
            get(info_handler::<R, S>),
        )
        .with_state(service)
}

fn error_response(error: ScheincriteriaServiceError) -> Response {
    let status = match &error {
        ScheincriteriaServiceError::Payload(_) => StatusCode::BAD_REQUEST,
        ScheincriteriaServiceError::CriterionNotFound(_)
        | ScheincriteriaServiceError::StudentNotFound(_)
        | ScheincriteriaServiceError::TutorialNotFound(_)
        | ScheincriteriaServiceError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        ScheincriteriaServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ScheincriteriaServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.find_all() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    axum::Json(dto): axum::Json<CriterionDto>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.create(dto) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(criterion_id): Path<Uuid>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.find_by_id(&CriterionId(criterion_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(criterion_id): Path<Uuid>,
    axum::Json(dto): axum::Json<CriterionDto>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.update(&CriterionId(criterion_id), dto) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(criterion_id): Path<Uuid>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.delete(&CriterionId(criterion_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn info_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(criterion_id): Path<Uuid>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.info_about_criteria(&CriterionId(criterion_id)) {
        Ok(information) => (StatusCode::OK, axum::Json(information)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn form_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    (StatusCode::OK, axum::Json(service.form_data())).into_response()
}

pub(crate) async fn all_results_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.results_of_all_students() {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn student_result_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(student_id): Path<Uuid>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.result_of_student(&StudentId(student_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tutorial_results_handler<R, S>(
    State(service): State<Arc<ScheincriteriaService<R, S>>>,
    Path(tutorial_id): Path<Uuid>,
) -> Response
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    match service.results_of_tutorial(&TutorialId(tutorial_id)) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}
