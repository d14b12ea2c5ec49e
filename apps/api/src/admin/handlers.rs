use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admin::stats::{dashboard, AdminDashboard, Period};
use crate::admin::users::{delete_user_cascade, fetch_user, list_users};
use crate::applications::handlers::JobApplicationsResponse;
use crate::applications::queries::list_for_job;
use crate::auth::guard::{require_not_self, require_role, FlashCategory};
use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::jobs::lifecycle::{delete_job, fetch_job, set_job_status};
use crate::models::application::ApplicationRow;
use crate::models::job::{JobRow, JobStatus};
use crate::models::user::{ProfileRow, Role, User};
use crate::pagination::{Page, PageQuery};
use crate::profiles::get_or_create;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

/// GET /api/v1/admin — dashboard statistics over a reporting window.
pub async fn handle_admin_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<AdminDashboard>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let period = Period::parse(query.period.as_deref());
    Ok(Json(dashboard(&state.db, period).await?))
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Page<User>,
    pub search: Option<String>,
}

/// GET /api/v1/admin/employers
pub async fn handle_list_employers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<UserSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let users = list_users(
        &state.db,
        Role::Employer,
        query.search.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(UserListResponse {
        users,
        search: query.search,
    }))
}

/// GET /api/v1/admin/jobseekers
pub async fn handle_list_jobseekers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<UserSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let users = list_users(
        &state.db,
        Role::Jobseeker,
        query.search.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(UserListResponse {
        users,
        search: query.search,
    }))
}

#[derive(Serialize)]
pub struct EmployerDetailResponse {
    pub employer: User,
    pub jobs: Vec<JobRow>,
    pub applications: Vec<ApplicationRow>,
}

/// GET /api/v1/admin/employers/:id
pub async fn handle_view_employer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employer_id): Path<Uuid>,
) -> Result<Json<EmployerDetailResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let employer = fetch_user(&state.db, employer_id).await?;
    if !employer.is_employer() {
        return Err(AppError::NotFound(format!("Employer {employer_id} not found")));
    }

    let jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(employer_id)
    .fetch_all(&state.db)
    .await?;
    let applications = sqlx::query_as::<_, ApplicationRow>(
        "SELECT a.* FROM applications a JOIN jobs j ON j.id = a.job_id \
         WHERE j.employer_id = $1 ORDER BY a.applied_at DESC, a.id DESC",
    )
    .bind(employer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EmployerDetailResponse {
        employer,
        jobs,
        applications,
    }))
}

#[derive(Serialize)]
pub struct JobseekerDetailResponse {
    pub jobseeker: User,
    pub profile: ProfileRow,
    pub applications: Vec<ApplicationRow>,
}

/// GET /api/v1/admin/jobseekers/:id
pub async fn handle_view_jobseeker(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(jobseeker_id): Path<Uuid>,
) -> Result<Json<JobseekerDetailResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let jobseeker = fetch_user(&state.db, jobseeker_id).await?;
    if !jobseeker.is_jobseeker() {
        return Err(AppError::NotFound(format!(
            "Jobseeker {jobseeker_id} not found"
        )));
    }

    let profile = get_or_create(&state.db, jobseeker_id).await?;
    let applications = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE jobseeker_id = $1 ORDER BY applied_at DESC, id DESC",
    )
    .bind(jobseeker_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(JobseekerDetailResponse {
        jobseeker,
        profile,
        applications,
    }))
}

#[derive(Serialize)]
pub struct AdminActionResponse {
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// DELETE /api/v1/admin/users/:id — cascades to everything the user owns.
/// Admins cannot delete themselves.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AdminActionResponse>, AppError> {
    let admin = require_role(Some(&user), &[Role::Admin])?;
    let target = fetch_user(&state.db, user_id).await?;
    let redirect = if target.is_employer() {
        "/admin/employers"
    } else {
        "/admin/jobseekers"
    };
    require_not_self(admin, target.id, redirect)?;

    delete_user_cascade(&state.db, target.id).await?;
    Ok(Json(AdminActionResponse {
        message: "User deleted successfully.".to_string(),
        category: FlashCategory::Success,
        redirect,
    }))
}

/// POST /api/v1/admin/jobs/:id/close
pub async fn handle_admin_close_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<AdminActionResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    fetch_job(&state.db, job_id).await?;
    set_job_status(&state.db, job_id, JobStatus::Closed).await?;
    Ok(Json(AdminActionResponse {
        message: "Job closed successfully.".to_string(),
        category: FlashCategory::Success,
        redirect: "/admin/jobs",
    }))
}

/// POST /api/v1/admin/jobs/:id/open
pub async fn handle_admin_open_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<AdminActionResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    fetch_job(&state.db, job_id).await?;
    set_job_status(&state.db, job_id, JobStatus::Active).await?;
    Ok(Json(AdminActionResponse {
        message: "Job reopened successfully.".to_string(),
        category: FlashCategory::Success,
        redirect: "/admin/jobs",
    }))
}

/// DELETE /api/v1/admin/jobs/:id
pub async fn handle_admin_delete_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<AdminActionResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    fetch_job(&state.db, job_id).await?;
    delete_job(&state.db, job_id).await?;
    Ok(Json(AdminActionResponse {
        message: "Job deleted successfully.".to_string(),
        category: FlashCategory::Success,
        redirect: "/admin/jobs",
    }))
}

/// GET /api/v1/admin/jobs/:id/applications — admin bypasses ownership via
/// the shared guard, so this reuses the employer listing shape.
pub async fn handle_admin_job_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobApplicationsResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    let applications = list_for_job(&state.db, job_id).await?;
    Ok(Json(JobApplicationsResponse { job, applications }))
}
