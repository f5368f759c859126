use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ApplicationId, CategoryId, CertificateId, CheckId, CriteriaId, DocumentId, Language,
    LicensingError, ReportId, ReviewStage, SolutionId, UserId,
};
use super::repository::{LicensingStore, RepositoryError, ReviewerDirectory};
use super::service::LicensingReviewService;
use super::snapshot::SnapshotStatus;

type SharedService<S, D> = Arc<LicensingReviewService<S, D>>;

/// Router builder exposing the licensing review endpoints.
pub fn licensing_router<S, D>(service: SharedService<S, D>) -> Router
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/licensing/criteria/:criteria_id/progress",
            get(criteria_progress_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/criteria/:criteria_id/upload",
            post(criteria_upload_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/criteria/:criteria_id/checks",
            post(criteria_check_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/criteria/:criteria_id/reupload",
            post(criteria_reupload_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/criteria/:criteria_id/reset",
            post(criteria_reset_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/documents/:check_id/progress",
            get(document_progress_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/documents/:check_id/checks",
            post(document_check_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/documents/:check_id/reset",
            post(document_reset_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/documents/:check_id/deadline",
            post(document_deadline_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/solutions/:solution_id",
            get(solution_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/solutions/:solution_id/status",
            post(solution_status_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/applications/:application_id/categories/:category_id/initial-report",
            get(initial_report_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/reports/:report_id",
            get(report_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/reports/:report_id/department",
            get(department_report_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/reports/:report_id/status",
            post(report_status_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/workflow",
            get(workflow_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/workflow/links",
            post(workflow_link_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/workflow/:category_id/statuses",
            get(status_chain_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/workflow/:category_id/statuses/links",
            post(status_link_handler::<S, D>),
        )
        .route(
            "/api/v1/licensing/certificates/:certificate_id",
            get(certificate_handler::<S, D>),
        )
        .with_state(service)
}

/// Maps core errors onto HTTP status codes with a JSON error body.
pub fn error_response(error: &LicensingError) -> Response {
    let status = match error {
        LicensingError::Validation(_) => StatusCode::BAD_REQUEST,
        LicensingError::NotFound { .. } | LicensingError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        LicensingError::Cycle { .. } | LicensingError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        LicensingError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: Serialize>(result: Result<T, LicensingError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => error_response(&error),
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub stage: ReviewStage,
    pub user_id: UserId,
    pub passed: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReuploadRequest {
    pub enabled: bool,
    #[serde(default)]
    pub documents: Option<Vec<DocumentId>>,
}

#[derive(Debug, Deserialize)]
pub struct DeadlineRequest {
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub extend_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: SnapshotStatus,
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub from: u64,
    pub to: u64,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowQuery {
    pub role: String,
    #[serde(default)]
    pub lang: Language,
}

pub(crate) async fn criteria_progress_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(criteria_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(
        service
            .criteria(CriteriaId(criteria_id))
            .map(|criteria| criteria.progress()),
    )
}

pub(crate) async fn criteria_upload_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(criteria_id): Path<u64>,
    Json(request): Json<UploadRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.upload_criteria(CriteriaId(criteria_id), request.user_id, Utc::now()))
}

pub(crate) async fn criteria_check_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(criteria_id): Path<u64>,
    Json(request): Json<CheckRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.mark_criteria(
        CriteriaId(criteria_id),
        request.stage,
        request.user_id,
        request.passed,
        Utc::now(),
    ))
}

pub(crate) async fn criteria_reupload_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(criteria_id): Path<u64>,
    Json(request): Json<ReuploadRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    let id = CriteriaId(criteria_id);
    if request.enabled {
        respond(service.enable_reupload(id, request.documents))
    } else {
        respond(service.disable_reupload(id))
    }
}

pub(crate) async fn criteria_reset_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(criteria_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.reset_criteria(CriteriaId(criteria_id)))
}

pub(crate) async fn document_progress_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(check_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.document(CheckId(check_id)).map(|document| {
        json!({
            "progress": document.progress(),
            "comments": document.all_comments(),
            "deadline": document.deadline,
            "overdue": document.is_overdue(Utc::now().date_naive()),
        })
    }))
}

pub(crate) async fn document_check_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(check_id): Path<u64>,
    Json(request): Json<CheckRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.mark_document(
        CheckId(check_id),
        request.stage,
        request.user_id,
        request.passed,
        request.comment,
        Utc::now(),
    ))
}

pub(crate) async fn document_reset_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(check_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.reset_document(CheckId(check_id)))
}

pub(crate) async fn document_deadline_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(check_id): Path<u64>,
    Json(request): Json<DeadlineRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    let id = CheckId(check_id);
    match (request.deadline, request.extend_days) {
        (Some(deadline), None) => {
            respond(service.set_deadline(id, deadline, Utc::now().date_naive()))
        }
        (None, Some(days)) => respond(service.extend_deadline(id, days)),
        _ => error_response(&LicensingError::Validation(
            "provide exactly one of deadline or extend_days".to_string(),
        )),
    }
}

pub(crate) async fn solution_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(solution_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.generate_solution(SolutionId(solution_id), Utc::now().date_naive()))
}

pub(crate) async fn solution_status_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(solution_id): Path<u64>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.transition_solution(SolutionId(solution_id), request.status, Utc::now()))
}

pub(crate) async fn initial_report_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((application_id, category_id)): Path<(u64, u64)>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.generate_initial_report(
        ApplicationId(application_id),
        CategoryId(category_id),
        Utc::now(),
    ))
}

pub(crate) async fn report_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(report_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.generate_report(ReportId(report_id)))
}

pub(crate) async fn department_report_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(report_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.generate_department_report(ReportId(report_id)))
}

pub(crate) async fn report_status_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(report_id): Path<u64>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.transition_report(ReportId(report_id), request.status, Utc::now()))
}

pub(crate) async fn workflow_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Query(query): Query<WorkflowQuery>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.workflow_chain(&query.role, query.lang))
}

pub(crate) async fn workflow_link_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Json(request): Json<LinkRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    match service.link_categories(request.from, request.to) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn status_chain_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(category_id): Path<u64>,
    Query(query): Query<WorkflowQuery>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.status_chain(category_id, &query.role, query.lang))
}

pub(crate) async fn status_link_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(category_id): Path<u64>,
    Json(request): Json<LinkRequest>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    match service.link_statuses(category_id, request.from, request.to) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn certificate_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path(certificate_id): Path<u64>,
) -> Response
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    respond(service.generate_certificate(CertificateId(certificate_id)))
}
