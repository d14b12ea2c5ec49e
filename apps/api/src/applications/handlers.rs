use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::lifecycle::{
    apply_decision, apply_to_job, fetch_application, withdraw, ReviewAction,
};
use crate::applications::queries::{
    admin_list, count_for_jobseeker, list_for_employer, list_for_job, list_for_jobseeker,
    recent_for_jobseeker,
};
use crate::auth::guard::{
    require_application_owner, require_job_owner, require_role, FlashCategory,
};
use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::jobs::lifecycle::fetch_job;
use crate::jobs::search::{applied_job_ids, recommended_jobs};
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;
use crate::models::user::Role;
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyForm {
    pub cover_letter: Option<String>,
    pub additional_notes: Option<String>,
}

#[derive(Serialize)]
pub struct ApplicationActionResponse {
    pub application: Option<ApplicationRow>,
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(form): Json<ApplyForm>,
) -> Result<(StatusCode, Json<ApplicationActionResponse>), AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    let job = fetch_job(&state.db, job_id).await?;
    let application = apply_to_job(
        &state.db,
        &job,
        jobseeker.id,
        form.cover_letter,
        form.additional_notes,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationActionResponse {
            application: Some(application),
            message: "Your application has been submitted successfully!".to_string(),
            category: FlashCategory::Success,
            redirect: "/jobseeker/applications",
        }),
    ))
}

/// DELETE /api/v1/applications/:id — withdraw a pending application.
pub async fn handle_withdraw(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationActionResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    let application = fetch_application(&state.db, application_id).await?;
    require_application_owner(jobseeker, &application)?;
    withdraw(&state.db, &application).await?;
    Ok(Json(ApplicationActionResponse {
        application: None,
        message: "Application withdrawn successfully.".to_string(),
        category: FlashCategory::Success,
        redirect: "/jobseeker/applications",
    }))
}

#[derive(Serialize)]
pub struct MyApplicationsResponse {
    pub applications: Page<ApplicationRow>,
    pub status_filter: Option<String>,
}

/// GET /api/v1/jobseeker/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(status): Query<StatusQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<MyApplicationsResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    let applications = list_for_jobseeker(
        &state.db,
        jobseeker.id,
        status.status.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(MyApplicationsResponse {
        applications,
        status_filter: status.status,
    }))
}

#[derive(Serialize)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationRow,
    pub job: JobRow,
}

/// GET /api/v1/applications/:id — a jobseeker's own application.
pub async fn handle_application_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    let application = fetch_application(&state.db, application_id).await?;
    require_application_owner(jobseeker, &application)?;
    let job = fetch_job(&state.db, application.job_id).await?;
    Ok(Json(ApplicationDetailResponse { application, job }))
}

#[derive(Serialize)]
pub struct JobseekerDashboard {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub accepted_applications: i64,
    pub rejected_applications: i64,
    pub recent_applications: Vec<ApplicationRow>,
    pub recommended_jobs: Vec<JobRow>,
}

/// GET /api/v1/jobseeker — dashboard statistics plus recommendations.
pub async fn handle_jobseeker_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<JobseekerDashboard>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;

    let total_applications = count_for_jobseeker(&state.db, jobseeker.id, None).await?;
    let pending_applications =
        count_for_jobseeker(&state.db, jobseeker.id, Some("pending")).await?;
    let accepted_applications =
        count_for_jobseeker(&state.db, jobseeker.id, Some("accepted")).await?;
    let rejected_applications =
        count_for_jobseeker(&state.db, jobseeker.id, Some("rejected")).await?;

    let recent_applications = recent_for_jobseeker(&state.db, jobseeker.id, 5).await?;
    let exclude = applied_job_ids(&state.db, jobseeker.id).await?;
    let recommended = recommended_jobs(&state.db, &exclude, 5).await?;

    Ok(Json(JobseekerDashboard {
        total_applications,
        pending_applications,
        accepted_applications,
        rejected_applications,
        recent_applications,
        recommended_jobs: recommended,
    }))
}

/// POST /api/v1/applications/:id/review
pub async fn handle_review(
    state: State<AppState>,
    user: CurrentUser,
    id: Path<Uuid>,
) -> Result<Json<ApplicationActionResponse>, AppError> {
    decide(
        state,
        user,
        id,
        ReviewAction::Review,
        "Application marked as reviewed.",
        FlashCategory::Info,
    )
    .await
}

/// POST /api/v1/applications/:id/accept
pub async fn handle_accept(
    state: State<AppState>,
    user: CurrentUser,
    id: Path<Uuid>,
) -> Result<Json<ApplicationActionResponse>, AppError> {
    decide(
        state,
        user,
        id,
        ReviewAction::Accept,
        "Application accepted!",
        FlashCategory::Success,
    )
    .await
}

/// POST /api/v1/applications/:id/reject
pub async fn handle_reject(
    state: State<AppState>,
    user: CurrentUser,
    id: Path<Uuid>,
) -> Result<Json<ApplicationActionResponse>, AppError> {
    decide(
        state,
        user,
        id,
        ReviewAction::Reject,
        "Application rejected.",
        FlashCategory::Warning,
    )
    .await
}

async fn decide(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(application_id): Path<Uuid>,
    action: ReviewAction,
    message: &str,
    category: FlashCategory,
) -> Result<Json<ApplicationActionResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let application = fetch_application(&state.db, application_id).await?;
    let job = fetch_job(&state.db, application.job_id).await?;
    require_job_owner(
        actor,
        &job,
        "You can only review applications for your own jobs.",
        "/employer/applications",
    )?;
    let application = apply_decision(&state.db, &application, action).await?;
    Ok(Json(ApplicationActionResponse {
        application: Some(application),
        message: message.to_string(),
        category,
        redirect: "/employer/applications",
    }))
}

#[derive(Serialize)]
pub struct EmployerApplicationsResponse {
    pub applications: Page<ApplicationRow>,
    pub status_filter: Option<String>,
}

/// GET /api/v1/employer/applications — across all of the employer's postings.
pub async fn handle_employer_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(status): Query<StatusQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<EmployerApplicationsResponse>, AppError> {
    let employer = require_role(Some(&user), &[Role::Employer])?;
    let applications = list_for_employer(
        &state.db,
        employer.id,
        status.status.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(EmployerApplicationsResponse {
        applications,
        status_filter: status.status,
    }))
}

#[derive(Serialize)]
pub struct JobApplicationsResponse {
    pub job: JobRow,
    pub applications: Vec<ApplicationRow>,
}

/// GET /api/v1/employer/jobs/:id/applications
pub async fn handle_job_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobApplicationsResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    require_job_owner(
        actor,
        &job,
        "You can only view applications for your own jobs.",
        "/employer/jobs",
    )?;
    let applications = list_for_job(&state.db, job_id).await?;
    Ok(Json(JobApplicationsResponse { job, applications }))
}

#[derive(Debug, Deserialize)]
pub struct AdminApplicationsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct AdminApplicationsResponse {
    pub applications: Page<ApplicationRow>,
    pub status_filter: Option<String>,
    pub search: Option<String>,
}

/// GET /api/v1/admin/applications
pub async fn handle_admin_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AdminApplicationsQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<AdminApplicationsResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let applications = admin_list(
        &state.db,
        query.status.as_deref(),
        query.search.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(AdminApplicationsResponse {
        applications,
        status_filter: query.status,
        search: query.search,
    }))
}
