//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting the admin routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use site_core::session::SessionRecord;
use std::sync::Arc;
use tracing::{error, info};

use crate::web::{auth::session_token, state::AppState};

/// Middleware that validates the session cookie and extracts the admin user.
///
/// Sessions older than the configured TTL are deleted and rejected.
/// If valid, inserts the `AdminUser` into request extensions for handlers to use.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse the session token from the cookie header
    let token = session_token(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 2. Look the session up
    let (user, issued_at) = state.store.get_admin_session(&token).await.map_err(|e| {
        error!("Failed to validate admin session: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    // 3. Enforce the expiry server-side
    let record = SessionRecord::new(user, issued_at);
    if !record.is_valid(Utc::now(), state.config.session_ttl) {
        info!("Admin session for {} expired", record.user.username);
        if let Err(e) = state.store.delete_admin_session(&token).await {
            error!("Failed to delete expired admin session: {:?}", e);
        }
        return Err(StatusCode::UNAUTHORIZED);
    }

    // 4. Insert the user into request extensions
    req.extensions_mut().insert(record.user);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
