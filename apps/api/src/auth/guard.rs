//! Role and ownership checks.
//!
//! Every check takes the acting user explicitly; nothing here reads ambient
//! request state, so the rules are testable without a running server. Role
//! checks run first, ownership predicates second; an action is allowed only
//! when both pass.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;
use crate::models::user::{Role, User};

/// User-visible message category, surfaced alongside the redirect on every
/// denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Info,
    Success,
    Warning,
    Danger,
}

/// Dashboard path for a role. Denied users are sent to their own dashboard,
/// chosen by inspecting the actor's role, never the requested resource; an
/// unrecognized role falls back to the public home page.
pub fn dashboard_for(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "/admin",
        Some(Role::Employer) => "/employer",
        Some(Role::Jobseeker) => "/jobseeker",
        None => "/",
    }
}

pub fn require_auth(actor: Option<&User>) -> Result<&User, AppError> {
    actor.ok_or(AppError::AuthenticationRequired)
}

/// Role gate. Unauthenticated actors get `AuthenticationRequired`; an
/// authenticated actor whose role is not in `allowed` is denied and pointed
/// at their own dashboard.
pub fn require_role<'a>(
    actor: Option<&'a User>,
    allowed: &[Role],
) -> Result<&'a User, AppError> {
    let user = require_auth(actor)?;
    match user.role() {
        Some(role) if allowed.contains(&role) => Ok(user),
        role => Err(AppError::AuthorizationDenied {
            message: "You do not have permission to access this page.".to_string(),
            category: FlashCategory::Danger,
            redirect: dashboard_for(role),
        }),
    }
}

/// Ownership gate for job mutations and per-job listings. Admins bypass
/// ownership; everyone else must own the posting.
pub fn require_job_owner(
    actor: &User,
    job: &JobRow,
    message: &str,
    redirect: &'static str,
) -> Result<(), AppError> {
    if actor.is_admin() || job.employer_id == actor.id {
        return Ok(());
    }
    Err(AppError::AuthorizationDenied {
        message: message.to_string(),
        category: FlashCategory::Danger,
        redirect,
    })
}

/// Ownership gate for a jobseeker's own application.
pub fn require_application_owner(
    actor: &User,
    application: &ApplicationRow,
) -> Result<(), AppError> {
    if application.jobseeker_id == actor.id {
        return Ok(());
    }
    Err(AppError::AuthorizationDenied {
        message: "Access denied.".to_string(),
        category: FlashCategory::Danger,
        redirect: "/jobseeker/applications",
    })
}

/// Admins may not delete their own account.
pub fn require_not_self(
    actor: &User,
    target_user_id: Uuid,
    redirect: &'static str,
) -> Result<(), AppError> {
    if actor.id == target_user_id {
        return Err(AppError::AuthorizationDenied {
            message: "You cannot delete your own account.".to_string(),
            category: FlashCategory::Danger,
            redirect,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: format!("{role}@example.com"),
            password_hash: "x".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_job(employer_id: Uuid) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            employer_id,
            title: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            company_name: "Acme".to_string(),
            company_description: None,
            location: "Remote".to_string(),
            salary: None,
            job_type: None,
            experience_level: None,
            required_skills: None,
            benefits: None,
            how_to_apply: None,
            application_email: None,
            status: "active".to_string(),
            views_count: 0,
            deadline: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_application(jobseeker_id: Uuid) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            jobseeker_id,
            status: "pending".to_string(),
            cover_letter: None,
            additional_notes: None,
            applied_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn denied_redirect(err: AppError) -> &'static str {
        match err {
            AppError::AuthorizationDenied { redirect, .. } => redirect,
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }

    #[test]
    fn unauthenticated_actor_is_rejected() {
        let err = require_role(None, &[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
    }

    #[test]
    fn matching_role_is_allowed() {
        let admin = make_user("admin");
        assert!(require_role(Some(&admin), &[Role::Admin]).is_ok());

        let employer = make_user("employer");
        assert!(require_role(Some(&employer), &[Role::Employer, Role::Admin]).is_ok());
    }

    #[test]
    fn mismatched_role_redirects_to_own_dashboard() {
        let jobseeker = make_user("jobseeker");
        let err = require_role(Some(&jobseeker), &[Role::Employer]).unwrap_err();
        assert_eq!(denied_redirect(err), "/jobseeker");

        let employer = make_user("employer");
        let err = require_role(Some(&employer), &[Role::Admin]).unwrap_err();
        assert_eq!(denied_redirect(err), "/employer");

        let admin = make_user("admin");
        let err = require_role(Some(&admin), &[Role::Jobseeker]).unwrap_err();
        assert_eq!(denied_redirect(err), "/admin");
    }

    #[test]
    fn unknown_role_redirects_home() {
        let stranger = make_user("moderator");
        let err = require_role(Some(&stranger), &[Role::Admin]).unwrap_err();
        assert_eq!(denied_redirect(err), "/");
    }

    #[test]
    fn denial_carries_danger_category() {
        let jobseeker = make_user("jobseeker");
        let err = require_role(Some(&jobseeker), &[Role::Admin]).unwrap_err();
        match err {
            AppError::AuthorizationDenied { category, .. } => {
                assert_eq!(category, FlashCategory::Danger)
            }
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }

    #[test]
    fn owner_may_touch_own_job() {
        let employer = make_user("employer");
        let job = make_job(employer.id);
        assert!(
            require_job_owner(&employer, &job, "You can only edit your own jobs.", "/employer/jobs")
                .is_ok()
        );
    }

    #[test]
    fn non_owner_is_denied() {
        let employer = make_user("employer");
        let job = make_job(Uuid::new_v4());
        let err = require_job_owner(
            &employer,
            &job,
            "You can only edit your own jobs.",
            "/employer/jobs",
        )
        .unwrap_err();
        assert_eq!(denied_redirect(err), "/employer/jobs");
    }

    #[test]
    fn admin_bypasses_job_ownership() {
        let admin = make_user("admin");
        let job = make_job(Uuid::new_v4());
        assert!(require_job_owner(&admin, &job, "nope", "/admin/jobs").is_ok());
    }

    #[test]
    fn application_ownership_is_strict() {
        let jobseeker = make_user("jobseeker");
        let own = make_application(jobseeker.id);
        assert!(require_application_owner(&jobseeker, &own).is_ok());

        let other = make_application(Uuid::new_v4());
        assert!(require_application_owner(&jobseeker, &other).is_err());
    }

    #[test]
    fn self_deletion_is_denied() {
        let admin = make_user("admin");
        let err = require_not_self(&admin, admin.id, "/admin/employers").unwrap_err();
        assert_eq!(denied_redirect(err), "/admin/employers");
        assert!(require_not_self(&admin, Uuid::new_v4(), "/admin/employers").is_ok());
    }
}
