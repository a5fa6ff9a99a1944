use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, LoginResponse, PublicUser, SignupRequest},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
        .route("/account/:user_id", delete(delete_account))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_signup(payload: &SignupRequest) -> Result<(), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_signup(&payload)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(
        json!({ "success": true, "message": "Registration successful" }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::validation("Invalid email"));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if payload.new_password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        warn!(user_id = user.id, "change password invalid credentials");
        return Err(ApiError::Unauthorized);
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = user.id, "password changed");
    Ok(Json(
        json!({ "success": true, "message": "Password updated" }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    info!(user_id, "account deleted");
    Ok(Json(json!({ "success": true, "message": "Account deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@shop.co.ke"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected_before_any_io() {
        let err = validate_signup(&signup("a@b.co", "longenough", "different"))
            .expect_err("mismatch must fail");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let err = validate_signup(&signup("a@b.co", "short", "short")).expect_err("too short");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn empty_fields_are_rejected() {
        let err = validate_signup(&signup("", "", "")).expect_err("empty must fail");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn valid_signup_passes_validation() {
        assert!(validate_signup(&signup("a@b.co", "longenough", "longenough")).is_ok());
    }
}
