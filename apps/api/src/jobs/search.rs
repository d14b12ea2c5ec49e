//! Filtered, paginated job retrieval.
//!
//! Filters compose conjunctively. Public and jobseeker listings only ever see
//! `status = 'active'` rows, whatever the filters say; draft and closed
//! postings are invisible there.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::pagination::{offset, Page, PER_PAGE_BROWSE, PER_PAGE_MANAGE};

/// Browse filters, echoed back to the caller. Empty strings count as absent.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub experience: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

/// Appends the conjunctive filter clauses shared by the SELECT and COUNT
/// queries. Substring matches are case-insensitive; type and experience are
/// exact.
fn push_job_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    if let Some(term) = non_empty(&filter.search) {
        let pattern = like_pattern(term);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(term) = non_empty(&filter.location) {
        qb.push(" AND location ILIKE ").push_bind(like_pattern(term));
    }
    if let Some(job_type) = non_empty(&filter.job_type) {
        qb.push(" AND job_type = ").push_bind(job_type.to_string());
    }
    if let Some(level) = non_empty(&filter.experience) {
        qb.push(" AND experience_level = ").push_bind(level.to_string());
    }
}

/// Public/jobseeker browse: active postings only, newest first, 9 per page.
pub async fn list_active_jobs(
    pool: &PgPool,
    filter: &JobFilter,
    page: i64,
) -> Result<Page<JobRow>, AppError> {
    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE status = 'active'");
    push_job_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM jobs WHERE status = 'active'");
    push_job_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(PER_PAGE_BROWSE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_BROWSE));
    let items = qb.build_query_as::<JobRow>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_BROWSE))
}

/// Employer's own postings, optionally narrowed to one status, 10 per page.
pub async fn list_employer_jobs(
    pool: &PgPool,
    employer_id: Uuid,
    status: Option<&str>,
    page: i64,
) -> Result<Page<JobRow>, AppError> {
    let status = status.map(str::trim).filter(|s| !s.is_empty());

    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE employer_id = ");
    count_qb.push_bind(employer_id);
    if let Some(status) = status {
        count_qb.push(" AND status = ").push_bind(status.to_string());
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM jobs WHERE employer_id = ");
    qb.push_bind(employer_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<JobRow>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

/// A posting with its derived application count. The count is always an
/// aggregate over the applications table, never a stored column.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct JobWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobRow,
    pub application_count: i64,
}

/// Admin listing across all employers, with per-job application counts,
/// status filter, and title/company search. 10 per page.
pub async fn admin_list_jobs(
    pool: &PgPool,
    status: Option<&str>,
    search: Option<&str>,
    page: i64,
) -> Result<Page<JobWithCount>, AppError> {
    let status = status.map(str::trim).filter(|s| !s.is_empty());
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE TRUE");
    push_admin_job_filters(&mut count_qb, status, search);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT j.*, (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS application_count \
         FROM jobs j WHERE TRUE",
    );
    push_admin_job_filters(&mut qb, status, search);
    qb.push(" ORDER BY j.created_at DESC, j.id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<JobWithCount>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

fn push_admin_job_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    status: Option<&str>,
    search: Option<&str>,
) {
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(term) = search {
        let pattern = like_pattern(term);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Active postings the jobseeker has not applied to, newest first. An empty
/// exclusion list is a structural no-op: `id <> ALL('{}')` is trivially true,
/// so no sentinel key is needed.
pub async fn recommended_jobs(
    pool: &PgPool,
    exclude_job_ids: &[Uuid],
    limit: i64,
) -> Result<Vec<JobRow>, AppError> {
    let jobs = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE status = 'active' AND id <> ALL($1) \
         ORDER BY created_at DESC, id DESC LIMIT $2",
    )
    .bind(exclude_job_ids)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(jobs)
}

/// Job ids the jobseeker has already applied to.
pub async fn applied_job_ids(pool: &PgPool, jobseeker_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    let ids = sqlx::query_scalar("SELECT job_id FROM applications WHERE jobseeker_id = $1")
        .bind(jobseeker_id)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Every public detail view bumps the counter by exactly one; repeat visits
/// by the same viewer are counted again (no dedup).
pub async fn increment_view_count(pool: &PgPool, job_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE jobs SET views_count = views_count + 1 WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Derived application count for one posting.
pub async fn application_count(pool: &PgPool, job_id: Uuid) -> Result<i64, AppError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_filter() -> JobFilter {
        JobFilter {
            search: Some("rust".to_string()),
            location: Some("Berlin".to_string()),
            job_type: Some("Full-time".to_string()),
            experience: Some("Senior".to_string()),
        }
    }

    #[test]
    fn empty_filter_adds_no_clauses() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE status = 'active'");
        push_job_filters(&mut qb, &JobFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM jobs WHERE status = 'active'");
    }

    #[test]
    fn blank_values_count_as_absent() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE status = 'active'");
        push_job_filters(
            &mut qb,
            &JobFilter {
                search: Some("   ".to_string()),
                location: Some(String::new()),
                job_type: None,
                experience: None,
            },
        );
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM jobs WHERE status = 'active'");
    }

    #[test]
    fn filters_compose_conjunctively() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM jobs WHERE status = 'active'");
        push_job_filters(&mut qb, &full_filter());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE status = 'active' \
             AND (title ILIKE $1 OR company_name ILIKE $2 OR description ILIKE $3) \
             AND location ILIKE $4 AND job_type = $5 AND experience_level = $6"
        );
    }

    #[test]
    fn search_matches_are_case_insensitive_substrings() {
        assert_eq!(like_pattern("rust"), "%rust%");
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 WHERE TRUE");
        push_job_filters(
            &mut qb,
            &JobFilter {
                search: Some("rust".to_string()),
                ..JobFilter::default()
            },
        );
        assert!(qb.sql().contains("ILIKE"));
    }

    #[test]
    fn admin_filters_cover_status_and_search() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE TRUE");
        push_admin_job_filters(&mut qb, Some("draft"), Some("acme"));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM jobs WHERE TRUE AND status = $1 \
             AND (title ILIKE $2 OR company_name ILIKE $3)"
        );
    }
}
