//! Job posting lifecycle: draft -> active <-> closed, plus cascading delete.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, JobStatus};

/// Submitted job form. Edit has full-replace semantics: every field here
/// overwrites the stored value, and an omitted deadline clears the column.
#[derive(Debug, Default, Deserialize)]
pub struct JobForm {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub company_description: Option<String>,
    pub location: String,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub required_skills: Option<String>,
    pub benefits: Option<String>,
    pub how_to_apply: Option<String>,
    pub application_email: Option<String>,
    pub status: Option<String>,
    /// Date-only string, `YYYY-MM-DD`.
    pub deadline: Option<String>,
}

/// Parses a date-only deadline string into a midnight UTC timestamp.
/// A missing or empty string is not an error; it means "no deadline".
pub fn parse_deadline(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        AppError::Validation("Invalid deadline date; expected YYYY-MM-DD.".to_string())
    })?;
    Ok(Some(date.and_time(NaiveTime::MIN).and_utc()))
}

/// Validates required fields and resolves the posting status, which defaults
/// to `active` when the form does not set one.
pub fn validate_form(form: &JobForm) -> Result<JobStatus, AppError> {
    for (value, label) in [
        (&form.title, "Title"),
        (&form.description, "Description"),
        (&form.company_name, "Company name"),
        (&form.location, "Location"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{label} is required.")));
        }
    }
    match form.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(JobStatus::Active),
        Some(s) => {
            JobStatus::parse(s).ok_or_else(|| AppError::Validation("Invalid job status.".to_string()))
        }
    }
}

pub async fn fetch_job(pool: &PgPool, id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

pub async fn create_job(
    pool: &PgPool,
    employer_id: Uuid,
    form: &JobForm,
) -> Result<JobRow, AppError> {
    let status = validate_form(form)?;
    let deadline = parse_deadline(form.deadline.as_deref())?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, employer_id, title, description, company_name, company_description,
             location, salary, job_type, experience_level, required_skills, benefits,
             how_to_apply, application_email, status, deadline)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employer_id)
    .bind(form.title.trim())
    .bind(&form.description)
    .bind(form.company_name.trim())
    .bind(&form.company_description)
    .bind(form.location.trim())
    .bind(&form.salary)
    .bind(&form.job_type)
    .bind(&form.experience_level)
    .bind(&form.required_skills)
    .bind(&form.benefits)
    .bind(&form.how_to_apply)
    .bind(&form.application_email)
    .bind(status.as_str())
    .bind(deadline)
    .fetch_one(pool)
    .await?;

    info!("Created job {} for employer {}", job.id, employer_id);
    Ok(job)
}

/// Full-replace edit. Unlike create, an omitted deadline here explicitly
/// nulls the stored deadline. The owner never changes.
pub async fn update_job(pool: &PgPool, job_id: Uuid, form: &JobForm) -> Result<JobRow, AppError> {
    let status = validate_form(form)?;
    let deadline = parse_deadline(form.deadline.as_deref())?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            title = $2, description = $3, company_name = $4, company_description = $5,
            location = $6, salary = $7, job_type = $8, experience_level = $9,
            required_skills = $10, benefits = $11, how_to_apply = $12,
            application_email = $13, status = $14, deadline = $15, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(form.title.trim())
    .bind(&form.description)
    .bind(form.company_name.trim())
    .bind(&form.company_description)
    .bind(form.location.trim())
    .bind(&form.salary)
    .bind(&form.job_type)
    .bind(&form.experience_level)
    .bind(&form.required_skills)
    .bind(&form.benefits)
    .bind(&form.how_to_apply)
    .bind(&form.application_email)
    .bind(status.as_str())
    .bind(deadline)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    Ok(job)
}

/// Sets the posting status. `open` maps to `active` (idempotent when already
/// active); `close` is valid from any non-deleted state.
pub async fn set_job_status(
    pool: &PgPool,
    job_id: Uuid,
    status: JobStatus,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE jobs SET status = $2, updated_at = now() WHERE id = $1")
        .bind(job_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    Ok(())
}

/// Deletes a job and all of its applications in one transaction, applications
/// first. No partially deleted state is ever visible.
pub async fn delete_job(pool: &PgPool, job_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM applications WHERE job_id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    tx.commit().await?;
    info!("Deleted job {job_id} and its applications");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_form() -> JobForm {
        JobForm {
            title: "Backend Engineer".to_string(),
            description: "Build the services".to_string(),
            company_name: "Acme".to_string(),
            location: "Remote".to_string(),
            ..JobForm::default()
        }
    }

    #[test]
    fn deadline_parses_to_midnight_utc() {
        let parsed = parse_deadline(Some("2026-01-15")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-15T00:00:00+00:00");
    }

    #[test]
    fn missing_or_empty_deadline_is_none() {
        assert_eq!(parse_deadline(None).unwrap(), None);
        assert_eq!(parse_deadline(Some("")).unwrap(), None);
        assert_eq!(parse_deadline(Some("   ")).unwrap(), None);
    }

    #[test]
    fn malformed_deadline_is_a_validation_error() {
        for bad in ["15-01-2026", "2026/01/15", "soon", "2026-13-40"] {
            let err = parse_deadline(Some(bad)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(validate_form(&minimal_form()).unwrap(), JobStatus::Active);

        let mut form = minimal_form();
        form.status = Some("draft".to_string());
        assert_eq!(validate_form(&form).unwrap(), JobStatus::Draft);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = minimal_form();
        form.status = Some("archived".to_string());
        assert!(matches!(
            validate_form(&form).unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut form = minimal_form();
        form.title = "  ".to_string();
        assert!(matches!(
            validate_form(&form).unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
