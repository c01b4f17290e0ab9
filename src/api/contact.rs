use axum::{Json, extract::State};
use std::sync::Arc;

use super::validation::validate_email;
use super::{ApiError, ApiResponse, AppState, ContactRequest};
use crate::services::ContactMessage;

/// POST /contact
/// Validates the submission, then relays it through the mail transport.
/// Validation failures never reach the relay.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if payload.name.is_empty()
        || payload.email.is_empty()
        || payload.subject.is_empty()
        || payload.message.is_empty()
    {
        return Err(ApiError::validation("All fields are required"));
    }

    validate_email(&payload.email)?;

    state
        .contact_service
        .ensure_configured()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state
        .contact_service
        .relay(ContactMessage {
            name: payload.name,
            email: payload.email,
            subject: payload.subject,
            message: payload.message,
        })
        .await
        .map_err(|e| ApiError::internal(format!("Failed to send message: {e:#}")))?;

    Ok(Json(ApiResponse::message("Message sent successfully!")))
}
