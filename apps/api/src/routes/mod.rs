pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{admin, applications, auth, jobs, profiles};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public
        .route("/", get(jobs::handlers::handle_home))
        .route("/api/v1/jobs", get(jobs::handlers::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handlers::handle_job_detail))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route("/api/v1/auth/me", get(auth::handlers::handle_me))
        // Jobseeker
        .route(
            "/api/v1/jobseeker",
            get(applications::handlers::handle_jobseeker_dashboard),
        )
        .route(
            "/api/v1/jobs/:id/apply",
            post(applications::handlers::handle_apply),
        )
        .route(
            "/api/v1/jobseeker/applications",
            get(applications::handlers::handle_my_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handlers::handle_application_detail)
                .delete(applications::handlers::handle_withdraw),
        )
        .route(
            "/api/v1/jobseeker/profile",
            get(profiles::handlers::handle_get_profile)
                .put(profiles::handlers::handle_update_profile),
        )
        .route(
            "/api/v1/jobseeker/resume",
            post(profiles::handlers::handle_upload_resume),
        )
        // Employer
        .route(
            "/api/v1/employer",
            get(jobs::handlers::handle_employer_dashboard),
        )
        .route(
            "/api/v1/employer/jobs",
            get(jobs::handlers::handle_employer_jobs).post(jobs::handlers::handle_create_job),
        )
        .route(
            "/api/v1/employer/jobs/:id",
            put(jobs::handlers::handle_update_job).delete(jobs::handlers::handle_delete_job),
        )
        .route(
            "/api/v1/employer/jobs/:id/close",
            post(jobs::handlers::handle_close_job),
        )
        .route(
            "/api/v1/employer/jobs/:id/open",
            post(jobs::handlers::handle_open_job),
        )
        .route(
            "/api/v1/employer/jobs/:id/applications",
            get(applications::handlers::handle_job_applications),
        )
        .route(
            "/api/v1/employer/applications",
            get(applications::handlers::handle_employer_applications),
        )
        .route(
            "/api/v1/employer/profile",
            put(profiles::handlers::handle_update_employer_account),
        )
        .route(
            "/api/v1/applications/:id/review",
            post(applications::handlers::handle_review),
        )
        .route(
            "/api/v1/applications/:id/accept",
            post(applications::handlers::handle_accept),
        )
        .route(
            "/api/v1/applications/:id/reject",
            post(applications::handlers::handle_reject),
        )
        // Admin
        .route("/api/v1/admin", get(admin::handlers::handle_admin_dashboard))
        .route(
            "/api/v1/admin/employers",
            get(admin::handlers::handle_list_employers),
        )
        .route(
            "/api/v1/admin/employers/:id",
            get(admin::handlers::handle_view_employer),
        )
        .route(
            "/api/v1/admin/jobseekers",
            get(admin::handlers::handle_list_jobseekers),
        )
        .route(
            "/api/v1/admin/jobseekers/:id",
            get(admin::handlers::handle_view_jobseeker),
        )
        .route(
            "/api/v1/admin/users/:id",
            delete(admin::handlers::handle_delete_user),
        )
        .route("/api/v1/admin/jobs", get(jobs::handlers::handle_admin_jobs))
        .route(
            "/api/v1/admin/jobs/:id",
            delete(admin::handlers::handle_admin_delete_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/close",
            post(admin::handlers::handle_admin_close_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/open",
            post(admin::handlers::handle_admin_open_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/applications",
            get(admin::handlers::handle_admin_job_applications),
        )
        .route(
            "/api/v1/admin/applications",
            get(applications::handlers::handle_admin_applications),
        )
        .with_state(state)
}
