use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::guard::{dashboard_for, FlashCategory};
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub message: String,
    pub category: FlashCategory,
    pub redirect: &'static str,
}

/// POST /api/v1/auth/register
///
/// Self-service registration is limited to employer and jobseeker accounts;
/// admins are provisioned out of band. The user and their empty profile are
/// created in one transaction.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = req.name.trim();
    if name.len() < 2 || name.len() > 100 {
        return Err(AppError::Validation(
            "Name must be between 2 and 100 characters.".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    validate_password(&req.password)?;

    let role = match Role::parse(&req.role) {
        Some(role @ (Role::Employer | Role::Jobseeker)) => role,
        _ => return Err(AppError::Validation("Invalid role selected.".to_string())),
    };

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("Email already registered.".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(name)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(role.as_str())
    .execute(&mut *tx)
    .await
    .map_err(map_duplicate_email)?;

    sqlx::query("INSERT INTO profiles (id, user_id) VALUES ($1, $2)")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("Registered {} account for {}", role.as_str(), req.email);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Account created successfully! Please log in.".to_string(),
            category: FlashCategory::Success,
            redirect: "/login",
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        return Err(AppError::Validation("Invalid email or password.".to_string()));
    };

    let token = state.tokens.issue(user.id)?;
    let redirect = dashboard_for(user.role());
    let message = format!("Welcome back, {}!", user.name);

    Ok(Json(LoginResponse {
        token,
        user,
        message,
        category: FlashCategory::Success,
        redirect,
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

fn map_duplicate_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Validation("Email already registered.".to_string());
        }
    }
    AppError::Database(e)
}
