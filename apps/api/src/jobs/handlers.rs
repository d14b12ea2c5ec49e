use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::auth::guard::{require_job_owner, require_role, FlashCategory};
use crate::auth::session::{CurrentUser, OptionalUser};
use crate::errors::AppError;
use crate::jobs::lifecycle::{
    create_job, delete_job, fetch_job, set_job_status, update_job, JobForm,
};
use crate::jobs::search::{
    admin_list_jobs, application_count, applied_job_ids, increment_view_count, list_active_jobs,
    list_employer_jobs, JobFilter, JobWithCount,
};
use crate::models::application::ApplicationRow;
use crate::models::job::{JobRow, JobStatus};
use crate::models::user::Role;
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

/// Title keywords backing the home-page category tiles.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("it", &["developer", "engineer", "tech"]),
    ("marketing", &["marketing", "sales", "advertising"]),
    ("sales", &["sales", "account", "business"]),
    ("design", &["design", "creative", "ui", "ux"]),
    ("finance", &["finance", "accounting", "bank"]),
];

#[derive(Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: i64,
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub featured_jobs: Vec<JobRow>,
    pub total_jobs: i64,
    pub total_applications: i64,
    pub total_companies: i64,
    pub total_candidates: i64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Page<JobRow>,
    pub filter: JobFilter,
    /// For an authenticated jobseeker: which listed jobs they already applied
    /// to. Empty for everyone else.
    pub applied_job_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: JobRow,
    pub application_count: i64,
    pub already_applied: bool,
}

#[derive(Serialize)]
pub struct JobActionResponse {
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// GET /
pub async fn handle_home(State(state): State<AppState>) -> Result<Json<HomeResponse>, AppError> {
    let featured_jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE status = 'active' ORDER BY created_at DESC, id DESC LIMIT 6",
    )
    .fetch_all(&state.db)
    .await?;

    let total_jobs = count_scalar(&state.db, "SELECT COUNT(*) FROM jobs WHERE status = 'active'").await?;
    let total_applications = count_scalar(&state.db, "SELECT COUNT(*) FROM applications").await?;
    let total_companies = count_role(&state.db, Role::Employer).await?;
    let total_candidates = count_role(&state.db, Role::Jobseeker).await?;

    let mut categories = Vec::with_capacity(CATEGORY_KEYWORDS.len());
    for &(category, keywords) in CATEGORY_KEYWORDS {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE status = 'active' AND (FALSE");
        for keyword in keywords {
            qb.push(" OR title ILIKE ").push_bind(format!("%{keyword}%"));
        }
        qb.push(")");
        let count: i64 = qb.build_query_scalar().fetch_one(&state.db).await?;
        categories.push(CategoryCount { category, count });
    }

    Ok(Json(HomeResponse {
        featured_jobs,
        total_jobs,
        total_applications,
        total_companies,
        total_candidates,
        categories,
    }))
}

/// GET /api/v1/jobs — public browse, active postings only.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
    Query(page): Query<PageQuery>,
    OptionalUser(actor): OptionalUser,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = list_active_jobs(&state.db, &filter, page.number()).await?;
    let applied = match actor.filter(|u| u.is_jobseeker()) {
        Some(user) => applied_job_ids(&state.db, user.id).await?,
        None => Vec::new(),
    };
    Ok(Json(JobListResponse {
        jobs,
        filter,
        applied_job_ids: applied,
    }))
}

/// GET /api/v1/jobs/:id — public detail. Every visit increments the view
/// counter; the increment is not gated on authentication.
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    OptionalUser(actor): OptionalUser,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = fetch_job(&state.db, job_id).await?;
    increment_view_count(&state.db, job_id).await?;

    let already_applied = match actor.filter(|u| u.is_jobseeker()) {
        Some(user) => applied_job_ids(&state.db, user.id).await?.contains(&job_id),
        None => false,
    };
    let count = application_count(&state.db, job_id).await?;

    Ok(Json(JobDetailResponse {
        job,
        application_count: count,
        already_applied,
    }))
}

#[derive(Serialize)]
pub struct EmployerDashboard {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub closed_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub recent_jobs: Vec<JobRow>,
    pub recent_applications: Vec<ApplicationRow>,
}

/// GET /api/v1/employer — dashboard statistics.
pub async fn handle_employer_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<EmployerDashboard>, AppError> {
    let employer = require_role(Some(&user), &[Role::Employer])?;

    let total_jobs = count_employer_jobs(&state.db, employer.id, None).await?;
    let active_jobs = count_employer_jobs(&state.db, employer.id, Some("active")).await?;
    let closed_jobs = count_employer_jobs(&state.db, employer.id, Some("closed")).await?;

    let total_applications: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications \
         WHERE job_id IN (SELECT id FROM jobs WHERE employer_id = $1)",
    )
    .bind(employer.id)
    .fetch_one(&state.db)
    .await?;
    let pending_applications: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications \
         WHERE status = 'pending' AND job_id IN (SELECT id FROM jobs WHERE employer_id = $1)",
    )
    .bind(employer.id)
    .fetch_one(&state.db)
    .await?;

    let recent_jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC, id DESC LIMIT 5",
    )
    .bind(employer.id)
    .fetch_all(&state.db)
    .await?;
    let recent_applications = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications \
         WHERE job_id IN (SELECT id FROM jobs WHERE employer_id = $1) \
         ORDER BY applied_at DESC, id DESC LIMIT 5",
    )
    .bind(employer.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EmployerDashboard {
        total_jobs,
        active_jobs,
        closed_jobs,
        total_applications,
        pending_applications,
        recent_jobs,
        recent_applications,
    }))
}

#[derive(Serialize)]
pub struct EmployerJobsResponse {
    pub jobs: Page<JobRow>,
    pub status_filter: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// GET /api/v1/employer/jobs
pub async fn handle_employer_jobs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(status): Query<StatusQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<EmployerJobsResponse>, AppError> {
    let employer = require_role(Some(&user), &[Role::Employer])?;
    let jobs = list_employer_jobs(
        &state.db,
        employer.id,
        status.status.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(EmployerJobsResponse {
        jobs,
        status_filter: status.status,
    }))
}

#[derive(Serialize)]
pub struct JobMutationResponse {
    pub job: JobRow,
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// POST /api/v1/employer/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<JobForm>,
) -> Result<(StatusCode, Json<JobMutationResponse>), AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = create_job(&state.db, actor.id, &form).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            job,
            message: "Job posted successfully!".to_string(),
            category: FlashCategory::Success,
            redirect: "/employer/jobs",
        }),
    ))
}

/// PUT /api/v1/employer/jobs/:id — full-replace edit.
pub async fn handle_update_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(form): Json<JobForm>,
) -> Result<Json<JobMutationResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    require_job_owner(actor, &job, "You can only edit your own jobs.", "/employer/jobs")?;
    let job = update_job(&state.db, job_id, &form).await?;
    Ok(Json(JobMutationResponse {
        job,
        message: "Job updated successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/employer/jobs",
    }))
}

/// POST /api/v1/employer/jobs/:id/close
pub async fn handle_close_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobActionResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    require_job_owner(actor, &job, "You can only close your own jobs.", "/employer/jobs")?;
    set_job_status(&state.db, job_id, JobStatus::Closed).await?;
    Ok(Json(JobActionResponse {
        message: "Job closed successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/employer/jobs",
    }))
}

/// POST /api/v1/employer/jobs/:id/open — reopen; idempotent on active jobs.
pub async fn handle_open_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobActionResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    require_job_owner(actor, &job, "You can only reopen your own jobs.", "/employer/jobs")?;
    set_job_status(&state.db, job_id, JobStatus::Active).await?;
    Ok(Json(JobActionResponse {
        message: "Job reopened successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/employer/jobs",
    }))
}

/// DELETE /api/v1/employer/jobs/:id — cascades to the job's applications.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobActionResponse>, AppError> {
    let actor = require_role(Some(&user), &[Role::Employer, Role::Admin])?;
    let job = fetch_job(&state.db, job_id).await?;
    require_job_owner(actor, &job, "You can only delete your own jobs.", "/employer/jobs")?;
    delete_job(&state.db, job_id).await?;
    Ok(Json(JobActionResponse {
        message: "Job deleted successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/employer/jobs",
    }))
}

#[derive(Serialize)]
pub struct AdminJobsResponse {
    pub jobs: Page<JobWithCount>,
    pub status_filter: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct AdminJobsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// GET /api/v1/admin/jobs — all postings with application counts.
pub async fn handle_admin_jobs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AdminJobsQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<AdminJobsResponse>, AppError> {
    require_role(Some(&user), &[Role::Admin])?;
    let jobs = admin_list_jobs(
        &state.db,
        query.status.as_deref(),
        query.search.as_deref(),
        page.number(),
    )
    .await?;
    Ok(Json(AdminJobsResponse {
        jobs,
        status_filter: query.status,
        search: query.search,
    }))
}

async fn count_scalar(pool: &PgPool, sql: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar(sql).fetch_one(pool).await?;
    Ok(count)
}

async fn count_role(pool: &PgPool, role: Role) -> Result<i64, AppError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn count_employer_jobs(
    pool: &PgPool,
    employer_id: Uuid,
    status: Option<&str>,
) -> Result<i64, AppError> {
    let count = match status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE employer_id = $1 AND status = $2")
                .bind(employer_id)
                .bind(status)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE employer_id = $1")
                .bind(employer_id)
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}
