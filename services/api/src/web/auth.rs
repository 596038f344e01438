//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for admin login and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use site_core::domain::AdminUser;
use site_core::ports::CredentialVerifier;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::adapters::credentials::Argon2Verifier;
use crate::error::HttpError;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub username: String,
}

/// Pulls the session token out of a `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|token| !token.is_empty())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Login as an admin
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Check the credentials against the stored argon2 hash
    let verifier = Argon2Verifier::new(state.store.clone());
    let user = verifier
        .verify(&req.username, &req.password)
        .await
        .map_err(|e| {
            error!("Login error for {}: {:?}", req.username, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
        })?
        .ok_or_else(|| {
            info!("Login rejected for {}", req.username);
            (StatusCode::UNAUTHORIZED, "Invalid username or password".to_string())
        })?;

    // 2. Drop sessions that have already outlived the TTL
    let now = Utc::now();
    match state
        .store
        .purge_admin_sessions(now - state.config.session_ttl)
        .await
    {
        Ok(0) => {}
        Ok(purged) => info!("Purged {} expired admin sessions", purged),
        Err(e) => warn!("Failed to purge expired admin sessions: {:?}", e),
    }

    // 3. Issue an opaque session token
    let token = Uuid::new_v4().to_string();
    state
        .store
        .create_admin_session(&token, &user.username, now)
        .await
        .map_err(|e| {
            error!("Failed to create admin session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    // 4. Hand it back as a cookie that expires with the session
    let cookie = format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.config.session_ttl.num_seconds()
    );
    info!("Login successful for {}", user.username);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            username: user.username,
        }),
    ))
}

/// POST /auth/logout - Invalidate the admin session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.store.delete_admin_session(token).await.map_err(|e| {
        error!("Failed to delete admin session: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
    })?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/me - The admin behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Not logged in or session expired")
    )
)]
pub async fn me_handler(Extension(user): Extension<AdminUser>) -> Json<AuthResponse> {
    Json(AuthResponse {
        username: user.username,
    })
}
