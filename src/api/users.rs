use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_email, validate_password};
use super::{ApiError, ApiResponse, AppState, CreateUserRequest, UpdateUserRequest, UserDto};

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.store.list_users().await?;
    let dtos: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .store
        .get_user_by_id(id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /admin/users
/// A duplicate email is rejected without touching the existing record.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    if state.store.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::validation("User already exists with this email"));
    }

    let user = state
        .store
        .create_user(&payload.email, &payload.password, &state.config.security)
        .await?;

    tracing::info!("Created user: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            UserDto::from(user),
            "User created successfully",
        )),
    ))
}

/// PUT /admin/users/{id}
/// Updates email and/or password (re-hashed). Any authenticated account may
/// update any other; there is no role model.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.email.is_none() && payload.password.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    if let Some(email) = payload.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(password) = payload.password.as_deref() {
        validate_password(password)?;
    }

    let updated = state
        .store
        .update_user(
            id,
            payload.email.as_deref(),
            payload.password.as_deref(),
            &state.config.security,
        )
        .await
        .map_err(|e| {
            // Surface the email-collision case as a client error.
            let msg = format!("{e:#}");
            if msg.contains("already exists") {
                ApiError::validation("User already exists with this email")
            } else {
                ApiError::internal(msg)
            }
        })?
        .ok_or_else(ApiError::user_not_found)?;

    tracing::info!("Updated user: {}", updated.email);

    Ok(Json(ApiResponse::success_with_message(
        UserDto::from(updated),
        "User updated successfully",
    )))
}

/// DELETE /admin/users/{id}
/// An account can never delete itself.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if current.0.id == id {
        return Err(ApiError::validation(
            "You cannot delete your own account",
        ));
    }

    let deleted = state.store.remove_user(id).await?;
    if deleted {
        tracing::info!(user_id = id, "Deleted user");
        Ok(Json(ApiResponse::message("User deleted successfully")))
    } else {
        Err(ApiError::user_not_found())
    }
}
