use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::guard::{require_role, FlashCategory};
use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{ProfileRow, Role, User};
use crate::profiles::{get_or_create, set_resume_path, update_account, update_profile, ProfileForm};
use crate::state::AppState;
use crate::storage::{allowed_extension, content_type_for, resume_key};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub profile: ProfileRow,
}

#[derive(Serialize)]
pub struct ProfileActionResponse {
    pub profile: Option<ProfileRow>,
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// GET /api/v1/jobseeker/profile — creates the profile on first access.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    let profile = get_or_create(&state.db, jobseeker.id).await?;
    Ok(Json(ProfileResponse {
        user: user.clone(),
        profile,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileForm,
}

/// PUT /api/v1/jobseeker/profile — account fields plus the full profile.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileActionResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;
    update_account(
        &state.db,
        jobseeker,
        &req.name,
        &req.email,
        req.password.as_deref(),
    )
    .await?;
    let profile = update_profile(&state.db, jobseeker.id, &req.profile).await?;
    Ok(Json(ProfileActionResponse {
        profile: Some(profile),
        message: "Profile updated successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/jobseeker/profile",
    }))
}

/// POST /api/v1/jobseeker/resume — multipart upload, field name `resume`.
/// Accepts pdf/doc/docx only; the stored key is per-user and unique per
/// upload time, and is recorded on the profile.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ProfileActionResponse>, AppError> {
    let jobseeker = require_role(Some(&user), &[Role::Jobseeker])?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Resume file name is missing.".to_string()))?;
        let Some(ext) = allowed_extension(&filename) else {
            return Err(AppError::Validation(
                "Resume must be a PDF, DOC, or DOCX file.".to_string(),
            ));
        };
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;

        let key = resume_key(jobseeker.id, Utc::now(), &ext);
        state
            .storage
            .put_resume(&key, content_type_for(&ext), body)
            .await?;
        set_resume_path(&state.db, jobseeker.id, &key).await?;

        let profile = get_or_create(&state.db, jobseeker.id).await?;
        return Ok(Json(ProfileActionResponse {
            profile: Some(profile),
            message: "Profile updated successfully!".to_string(),
            category: FlashCategory::Success,
            redirect: "/jobseeker/profile",
        }));
    }

    Err(AppError::Validation("No resume file submitted.".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub user: User,
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// PUT /api/v1/employer/profile — employers have no extended profile, just
/// the account fields.
pub async fn handle_update_employer_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let employer = require_role(Some(&user), &[Role::Employer])?;
    let updated = update_account(
        &state.db,
        employer,
        &req.name,
        &req.email,
        req.password.as_deref(),
    )
    .await?;
    Ok(Json(AccountResponse {
        user: updated,
        message: "Profile updated successfully!".to_string(),
        category: FlashCategory::Success,
        redirect: "/employer/profile",
    }))
}
