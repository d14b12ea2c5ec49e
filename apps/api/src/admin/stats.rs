//! Admin dashboard statistics.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::user::User;

/// Reporting window for the "new records" counters. Anything unrecognized
/// falls back to yearly, matching the widest window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    pub fn parse(s: Option<&str>) -> Period {
        match s {
            None => Period::Monthly,
            Some("daily") => Period::Daily,
            Some("weekly") => Period::Weekly,
            Some("monthly") => Period::Monthly,
            Some(_) => Period::Yearly,
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Daily => now - Duration::days(1),
            Period::Weekly => now - Duration::weeks(1),
            Period::Monthly => now - Duration::days(30),
            Period::Yearly => now - Duration::days(365),
        }
    }
}

#[derive(Serialize)]
pub struct AdminDashboard {
    pub period: Period,

    pub total_users: i64,
    pub total_employers: i64,
    pub total_jobseekers: i64,
    pub total_jobs: i64,
    pub total_applications: i64,

    pub new_employers: i64,
    pub new_jobseekers: i64,
    pub new_jobs: i64,
    pub new_applications: i64,

    pub active_jobs: i64,
    pub closed_jobs: i64,
    pub draft_jobs: i64,
    pub pending_applications: i64,

    pub recent_users: Vec<User>,
    pub recent_jobs: Vec<JobRow>,
}

pub async fn dashboard(pool: &PgPool, period: Period) -> Result<AdminDashboard, AppError> {
    let cutoff = period.cutoff(Utc::now());

    let total_users = scalar(pool, "SELECT COUNT(*) FROM users").await?;
    let total_employers = scalar(pool, "SELECT COUNT(*) FROM users WHERE role = 'employer'").await?;
    let total_jobseekers =
        scalar(pool, "SELECT COUNT(*) FROM users WHERE role = 'jobseeker'").await?;
    let total_jobs = scalar(pool, "SELECT COUNT(*) FROM jobs").await?;
    let total_applications = scalar(pool, "SELECT COUNT(*) FROM applications").await?;

    let new_employers: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'employer' AND created_at >= $1",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    let new_jobseekers: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'jobseeker' AND created_at >= $1",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    let new_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE created_at >= $1")
        .bind(cutoff)
        .fetch_one(pool)
        .await?;
    let new_applications: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE applied_at >= $1")
            .bind(cutoff)
            .fetch_one(pool)
            .await?;

    let active_jobs = scalar(pool, "SELECT COUNT(*) FROM jobs WHERE status = 'active'").await?;
    let closed_jobs = scalar(pool, "SELECT COUNT(*) FROM jobs WHERE status = 'closed'").await?;
    let draft_jobs = scalar(pool, "SELECT COUNT(*) FROM jobs WHERE status = 'draft'").await?;
    let pending_applications =
        scalar(pool, "SELECT COUNT(*) FROM applications WHERE status = 'pending'").await?;

    let recent_users =
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT 5")
            .fetch_all(pool)
            .await?;
    let recent_jobs =
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC, id DESC LIMIT 5")
            .fetch_all(pool)
            .await?;

    Ok(AdminDashboard {
        period,
        total_users,
        total_employers,
        total_jobseekers,
        total_jobs,
        total_applications,
        new_employers,
        new_jobseekers,
        new_jobs,
        new_applications,
        active_jobs,
        closed_jobs,
        draft_jobs,
        pending_applications,
        recent_users,
        recent_jobs,
    })
}

async fn scalar(pool: &PgPool, sql: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar(sql).fetch_one(pool).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parse_defaults_to_monthly() {
        assert_eq!(Period::parse(None), Period::Monthly);
        assert_eq!(Period::parse(Some("daily")), Period::Daily);
        assert_eq!(Period::parse(Some("weekly")), Period::Weekly);
        assert_eq!(Period::parse(Some("monthly")), Period::Monthly);
    }

    #[test]
    fn unknown_period_widens_to_yearly() {
        assert_eq!(Period::parse(Some("quarterly")), Period::Yearly);
        assert_eq!(Period::parse(Some("")), Period::Yearly);
    }

    #[test]
    fn cutoffs_match_window_lengths() {
        let now = Utc::now();
        assert_eq!(Period::Daily.cutoff(now), now - Duration::days(1));
        assert_eq!(Period::Weekly.cutoff(now), now - Duration::days(7));
        assert_eq!(Period::Monthly.cutoff(now), now - Duration::days(30));
        assert_eq!(Period::Yearly.cutoff(now), now - Duration::days(365));
    }
}
