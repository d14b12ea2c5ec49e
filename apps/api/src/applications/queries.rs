//! Filtered, paginated application retrieval for each role's listings.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::pagination::{offset, Page, PER_PAGE_MANAGE};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// A jobseeker's own applications, optionally narrowed to one status.
pub async fn list_for_jobseeker(
    pool: &PgPool,
    jobseeker_id: Uuid,
    status: Option<&str>,
    page: i64,
) -> Result<Page<ApplicationRow>, AppError> {
    let status = non_empty(status);

    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM applications WHERE jobseeker_id = ");
    count_qb.push_bind(jobseeker_id);
    if let Some(status) = status {
        count_qb.push(" AND status = ").push_bind(status.to_string());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM applications WHERE jobseeker_id = ");
    qb.push_bind(jobseeker_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY applied_at DESC, id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<ApplicationRow>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

/// Applications across all of an employer's postings.
pub async fn list_for_employer(
    pool: &PgPool,
    employer_id: Uuid,
    status: Option<&str>,
    page: i64,
) -> Result<Page<ApplicationRow>, AppError> {
    let status = non_empty(status);

    let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COUNT(*) FROM applications \
         WHERE job_id IN (SELECT id FROM jobs WHERE employer_id = ",
    );
    count_qb.push_bind(employer_id).push(")");
    if let Some(status) = status {
        count_qb.push(" AND status = ").push_bind(status.to_string());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT * FROM applications \
         WHERE job_id IN (SELECT id FROM jobs WHERE employer_id = ",
    );
    qb.push_bind(employer_id).push(")");
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY applied_at DESC, id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<ApplicationRow>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

/// Every application for one posting, newest first (no pagination; the
/// per-job review screen shows them all).
pub async fn list_for_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<ApplicationRow>, AppError> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at DESC, id DESC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Admin listing across everything, with a status filter and a search over
/// the job title and the applicant's name/email.
pub async fn admin_list(
    pool: &PgPool,
    status: Option<&str>,
    search: Option<&str>,
    page: i64,
) -> Result<Page<ApplicationRow>, AppError> {
    let status = non_empty(status);
    let search = non_empty(search);

    let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COUNT(*) FROM applications a \
         JOIN jobs j ON j.id = a.job_id \
         JOIN users u ON u.id = a.jobseeker_id WHERE TRUE",
    );
    push_admin_filters(&mut count_qb, status, search);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT a.* FROM applications a \
         JOIN jobs j ON j.id = a.job_id \
         JOIN users u ON u.id = a.jobseeker_id WHERE TRUE",
    );
    push_admin_filters(&mut qb, status, search);
    qb.push(" ORDER BY a.applied_at DESC, a.id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<ApplicationRow>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

fn push_admin_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    status: Option<&str>,
    search: Option<&str>,
) {
    if let Some(status) = status {
        qb.push(" AND a.status = ").push_bind(status.to_string());
    }
    if let Some(term) = search {
        let pattern = format!("%{term}%");
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Count of a jobseeker's applications, optionally by status.
pub async fn count_for_jobseeker(
    pool: &PgPool,
    jobseeker_id: Uuid,
    status: Option<&str>,
) -> Result<i64, AppError> {
    let count = match status {
        Some(status) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM applications WHERE jobseeker_id = $1 AND status = $2",
            )
            .bind(jobseeker_id)
            .bind(status)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE jobseeker_id = $1")
                .bind(jobseeker_id)
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}

/// A jobseeker's most recent applications for the dashboard.
pub async fn recent_for_jobseeker(
    pool: &PgPool,
    jobseeker_id: Uuid,
    limit: i64,
) -> Result<Vec<ApplicationRow>, AppError> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE jobseeker_id = $1 \
         ORDER BY applied_at DESC, id DESC LIMIT $2",
    )
    .bind(jobseeker_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_filters_join_status_and_search() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM applications a WHERE TRUE");
        push_admin_filters(&mut qb, Some("pending"), Some("alice"));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM applications a WHERE TRUE AND a.status = $1 \
             AND (j.title ILIKE $2 OR u.name ILIKE $3 OR u.email ILIKE $4)"
        );
    }

    #[test]
    fn absent_filters_add_nothing() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM applications a WHERE TRUE");
        push_admin_filters(&mut qb, None, None);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM applications a WHERE TRUE");
    }
}
