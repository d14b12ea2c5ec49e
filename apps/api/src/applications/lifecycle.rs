//! Application lifecycle: pending -> {reviewed, accepted, rejected}.
//!
//! `reviewed` is an informational marker, not a gate: accept and reject are
//! valid from both `pending` and `reviewed`. `accepted` and `rejected` are
//! terminal. Withdrawal is only possible while pending and removes the row
//! entirely; it is not a status.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::{map_duplicate_application, AppError};
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::job::JobRow;

/// Employer decision on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Review,
    Accept,
    Reject,
}

impl ReviewAction {
    pub fn target(&self) -> ApplicationStatus {
        match self {
            ReviewAction::Review => ApplicationStatus::Reviewed,
            ReviewAction::Accept => ApplicationStatus::Accepted,
            ReviewAction::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Transition table. Returns the resulting status, or `InvalidTransition`
/// when the application has already reached a terminal decision.
pub fn transition(
    current: ApplicationStatus,
    action: ReviewAction,
) -> Result<ApplicationStatus, AppError> {
    match current {
        ApplicationStatus::Pending | ApplicationStatus::Reviewed => Ok(action.target()),
        ApplicationStatus::Accepted | ApplicationStatus::Rejected => {
            Err(AppError::InvalidTransition(format!(
                "Application has already been {}.",
                current.as_str()
            )))
        }
    }
}

/// Withdrawal precondition: only a pending application can be withdrawn.
pub fn can_withdraw(current: ApplicationStatus) -> Result<(), AppError> {
    match current {
        ApplicationStatus::Pending => Ok(()),
        _ => Err(AppError::InvalidTransition(
            "Cannot withdraw an application that has already been reviewed.".to_string(),
        )),
    }
}

pub async fn fetch_application(pool: &PgPool, id: Uuid) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// Submits an application. The existence check is a fast-path rejection; the
/// UNIQUE (job_id, jobseeker_id) constraint is the authoritative guard under
/// a concurrent double-submit, and its violation maps to the same error.
pub async fn apply_to_job(
    pool: &PgPool,
    job: &JobRow,
    jobseeker_id: Uuid,
    cover_letter: Option<String>,
    additional_notes: Option<String>,
) -> Result<ApplicationRow, AppError> {
    let existing: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM applications WHERE job_id = $1 AND jobseeker_id = $2",
    )
    .bind(job.id)
    .bind(jobseeker_id)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::DuplicateApplication);
    }

    if !job.is_active() {
        return Err(AppError::JobNotAcceptingApplications);
    }

    let application = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, job_id, jobseeker_id, status, cover_letter, additional_notes)
        VALUES ($1, $2, $3, 'pending', $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.id)
    .bind(jobseeker_id)
    .bind(cover_letter)
    .bind(additional_notes)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_application)?;

    info!(
        "Jobseeker {} applied to job {} (application {})",
        jobseeker_id, job.id, application.id
    );
    Ok(application)
}

/// Applies an employer decision after validating the transition.
pub async fn apply_decision(
    pool: &PgPool,
    application: &ApplicationRow,
    action: ReviewAction,
) -> Result<ApplicationRow, AppError> {
    let current = ApplicationStatus::parse(&application.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "application {} has unknown status {:?}",
            application.id,
            application.status
        ))
    })?;
    let next = transition(current, action)?;

    let updated = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(application.id)
    .bind(next.as_str())
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

/// Withdraws (deletes) a pending application.
pub async fn withdraw(pool: &PgPool, application: &ApplicationRow) -> Result<(), AppError> {
    let current = ApplicationStatus::parse(&application.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "application {} has unknown status {:?}",
            application.id,
            application.status
        ))
    })?;
    can_withdraw(current)?;

    sqlx::query("DELETE FROM applications WHERE id = $1")
        .bind(application.id)
        .execute(pool)
        .await?;
    info!("Application {} withdrawn", application.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus::*;

    #[test]
    fn pending_accepts_every_decision() {
        assert_eq!(transition(Pending, ReviewAction::Review).unwrap(), Reviewed);
        assert_eq!(transition(Pending, ReviewAction::Accept).unwrap(), Accepted);
        assert_eq!(transition(Pending, ReviewAction::Reject).unwrap(), Rejected);
    }

    #[test]
    fn reviewed_is_not_a_gate() {
        assert_eq!(transition(Reviewed, ReviewAction::Accept).unwrap(), Accepted);
        assert_eq!(transition(Reviewed, ReviewAction::Reject).unwrap(), Rejected);
        assert_eq!(transition(Reviewed, ReviewAction::Review).unwrap(), Reviewed);
    }

    #[test]
    fn terminal_states_reject_every_decision() {
        for current in [Accepted, Rejected] {
            for action in [ReviewAction::Review, ReviewAction::Accept, ReviewAction::Reject] {
                let err = transition(current, action).unwrap_err();
                assert!(matches!(err, AppError::InvalidTransition(_)));
            }
        }
    }

    #[test]
    fn only_pending_can_withdraw() {
        assert!(can_withdraw(Pending).is_ok());
        for current in [Reviewed, Accepted, Rejected] {
            let err = can_withdraw(current).unwrap_err();
            match err {
                AppError::InvalidTransition(msg) => {
                    assert!(msg.contains("Cannot withdraw"), "{msg}")
                }
                other => panic!("expected InvalidTransition, got {other:?}"),
            }
        }
    }
}
