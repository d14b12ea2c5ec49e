use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Posting lifecycle: `draft -> active <-> closed`. Deletion exits the
/// lifecycle from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }

    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "active" => Some(JobStatus::Active),
            "closed" => Some(JobStatus::Closed),
            "draft" => Some(JobStatus::Draft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub employer_id: Uuid,
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
    pub status: String,
    pub views_count: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
