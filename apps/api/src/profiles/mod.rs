//! Jobseeker profile persistence.

pub mod handlers;

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password};
use crate::errors::AppError;
use crate::models::user::{ProfileRow, User};

/// Submitted profile form. Update has full-replace semantics over these
/// fields; resume_path is managed separately by the upload flow.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub additional_details: Option<String>,
}

/// Returns the user's profile, creating an empty row on first access.
/// The insert is idempotent under a concurrent first access: the loser of
/// the race reads the winner's row.
pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<ProfileRow, AppError> {
    if let Some(profile) =
        sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(profile);
    }

    sqlx::query("INSERT INTO profiles (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(pool)
        .await?;

    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(profile)
}

/// Full-replace update of the profile fields.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    form: &ProfileForm,
) -> Result<ProfileRow, AppError> {
    // Make sure the row exists before updating it; first save wins the create.
    get_or_create(pool, user_id).await?;

    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE profiles SET
            phone = $2, address = $3, linkedin = $4, github = $5, bio = $6,
            skills = $7, experience_years = $8, education = $9,
            additional_details = $10, updated_at = now()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&form.phone)
    .bind(&form.address)
    .bind(&form.linkedin)
    .bind(&form.github)
    .bind(&form.bio)
    .bind(&form.skills)
    .bind(form.experience_years)
    .bind(&form.education)
    .bind(&form.additional_details)
    .fetch_one(pool)
    .await?;
    Ok(profile)
}

/// Records the stored reference of the latest uploaded resume.
pub async fn set_resume_path(pool: &PgPool, user_id: Uuid, key: &str) -> Result<(), AppError> {
    get_or_create(pool, user_id).await?;
    sqlx::query("UPDATE profiles SET resume_path = $2, updated_at = now() WHERE user_id = $1")
        .bind(user_id)
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Account-level update shared by employer and jobseeker profile screens:
/// name, email, and an optional password change (minimum length enforced).
pub async fn update_account(
    pool: &PgPool,
    user: &User,
    name: &str,
    email: &str,
    new_password: Option<&str>,
) -> Result<User, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required.".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }

    let password_hash = match new_password.filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = $2,
            email = $3,
            password_hash = COALESCE($4, password_hash),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(map_duplicate_email)?;
    Ok(updated)
}

fn map_duplicate_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Validation("Email already registered.".to_string());
        }
    }
    AppError::Database(e)
}
