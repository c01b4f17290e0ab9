use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::db::User;

pub const SESSION_USER_KEY: &str = "user";

/// The account resolved by the auth middleware, available to protected
/// handlers as a request extension.
#[derive(Clone)]
pub struct CurrentUser(pub User);

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoResponse {
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Session gate for admin pages and mutating routes. Accepts:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    // Check session first (fastest path for the admin UI)
    if let Ok(Some(email)) = session.get::<String>(SESSION_USER_KEY).await
        && let Ok(Some(user)) = state.store.get_user_by_email(&email).await
    {
        tracing::Span::current().record("user_id", email.as_str());
        request.extensions_mut().insert(CurrentUser(user));
        return Ok(next.run(request).await);
    }

    if let Some(key) = extract_api_key(&headers)
        && let Ok(Some(user)) = state.store.verify_api_key(&key).await
    {
        tracing::Span::current().record("user_id", user.email.as_str());
        request.extensions_mut().insert(CurrentUser(user));
        return Ok(next.run(request).await);
    }

    let body = ApiResponse::<()>::error("Not authenticated");
    Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response())
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password, returns the API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let is_valid = state
        .store
        .verify_user_password(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store
        .get_user_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if let Err(e) = session.insert(SESSION_USER_KEY, &payload.email).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!("Login: {}", user.email);

    Ok(Json(ApiResponse::success(LoginResponse {
        email: user.email,
        api_key: user.api_key,
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<()>> {
    let _ = session.flush().await;
    Json(ApiResponse::message("Logged out"))
}

/// GET /auth/me
/// Get current account information (requires authentication)
pub async fn get_current_user(
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> Json<ApiResponse<SessionInfoResponse>> {
    let user = current.0;
    Json(ApiResponse::success(SessionInfoResponse {
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}
