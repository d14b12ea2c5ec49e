use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// File types accepted for resume upload.
pub const ALLOWED_RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Lowercased extension of `filename` if it is one of the accepted resume
/// types; `None` for anything else (including extensionless names).
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    ALLOWED_RESUME_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Storage key for an uploaded resume: per-user, unique per upload time.
pub fn resume_key(user_id: Uuid, uploaded_at: DateTime<Utc>, ext: &str) -> String {
    format!("resumes/{}/{}.{}", user_id, uploaded_at.timestamp(), ext)
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Pluggable resume storage. The production implementation is S3/MinIO; the
/// seam exists so the core never touches the SDK directly.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn put_resume(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), AppError>;
}

pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn put_resume(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;
        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions_case_insensitively() {
        assert_eq!(allowed_extension("resume.pdf").as_deref(), Some("pdf"));
        assert_eq!(allowed_extension("Resume.DOCX").as_deref(), Some("docx"));
        assert_eq!(allowed_extension("cv.old.doc").as_deref(), Some("doc"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(allowed_extension("resume.exe"), None);
        assert_eq!(allowed_extension("resume.pdf.sh"), None);
        assert_eq!(allowed_extension("resume"), None);
        assert_eq!(allowed_extension(""), None);
    }

    #[test]
    fn resume_keys_are_per_user_and_per_upload() {
        let user_id = Uuid::new_v4();
        let at = DateTime::parse_from_rfc3339("2026-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let key = resume_key(user_id, at, "pdf");
        assert_eq!(key, format!("resumes/{}/{}.pdf", user_id, at.timestamp()));
    }
}
