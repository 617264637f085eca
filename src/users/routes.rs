//! HTTP handlers for user listing and the auth endpoints.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};

use crate::auth;
use crate::error::ApiError;
use crate::http::{AppState, preflight};
use crate::users::model::{LoginRequest, NewUser, RegisterRequest, UserResponse};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).options(preflight))
        .route("/api/auth/register", post(register).options(preflight))
        .route("/api/auth/login", post(login).options(preflight))
        .route("/api/auth/logout", post(logout).options(preflight))
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users: Vec<UserResponse> = state
        .db
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    let count = users.len();
    Ok(Json(json!({
        "success": true,
        "users": users,
        "count": count,
        "message": "User list retrieved",
    })))
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
    req.validate()?;

    let password_hash = auth::hash_password(&req.password)
        .map_err(|e| ApiError::Unexpected(format!("Password hashing failed: {e}")))?;

    // Uniqueness is enforced by the users.username constraint; a duplicate
    // comes back as a Conflict, with no lookup-then-insert race.
    let user = state
        .db
        .create_user(&NewUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
        })
        .await?;

    info!(username = %user.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered",
            "user": UserResponse::from(user),
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
    req.validate()?;

    let username = req.username.trim();
    let user = match state.db.find_user_by_username(username).await? {
        Some(u) if u.is_active && auth::verify_password(&req.password, &u.password_hash) => u,
        // Missing user, wrong password, and inactive account all take the
        // same exit — one status, one message.
        _ => {
            warn!(username, "Login failed");
            return Err(ApiError::Unauthenticated);
        }
    };

    state.db.touch_last_login(user.id).await?;
    info!(username = %user.username, "Login successful");
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": UserResponse::from(user),
    })))
}

async fn logout() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logged out",
    }))
}
