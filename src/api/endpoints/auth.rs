//! Account endpoints.
//!
//! `POST /api/auth/register`: Unprotected: create an account
//! `POST /api/auth/login`: Unprotected: exchange credentials for a bearer token
//! `POST /api/auth/logout`: Protected: end the caller's session

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, AuthenticatedUser};
use crate::auth::{self, RegisterOutcome};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub outcome: RegisterOutcome,
    pub message: &'static str,
}

/// `POST /api/auth/register`: an existing username is not an error; the
/// outcome says so and nothing is written.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    auth::validate_credentials(&req.username, &req.password)?;

    let store = ctx.auth.clone();
    let outcome = run_blocking(move || {
        let conn = store.open()?;
        Ok(auth::register(&conn, req.username.trim(), &req.password)?)
    })
    .await?;

    let message = match outcome {
        RegisterOutcome::Created => "User registered successfully",
        RegisterOutcome::AlreadyExists => "Username already exists",
    };
    Ok(Json(RegisterResponse { outcome, message }))
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    auth::validate_credentials(&req.username, &req.password)?;

    let username = req.username.trim().to_string();
    let store = ctx.auth.clone();
    let lookup_name = username.clone();
    let ok = run_blocking(move || {
        let conn = store.open()?;
        Ok(auth::login(&conn, &lookup_name, &req.password))
    })
    .await?;

    if !ok {
        tracing::info!(%username, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx.sessions.create(&username)?;
    tracing::info!(%username, "Login succeeded");
    Ok(Json(LoginResponse { token, username }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let logged_out = ctx.sessions.remove(&user.token)?;
    tracing::info!(username = %user.username, "Logged out");
    Ok(Json(LogoutResponse { logged_out }))
}
