use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    validate_description, validate_item_id, validate_service, validate_title,
};
use super::{ApiError, ApiResponse, AppState, PortfolioItemDto};
use crate::models::portfolio::parse_technologies;
use crate::services::{CreatePortfolioItem, UpdatePortfolioItem, UploadPayload};

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub service: Option<String>,
}

/// Everything a portfolio multipart form can carry. Create and update share
/// the field set; update additionally understands `removeThumbnail`.
#[derive(Default)]
struct PortfolioForm {
    title: Option<String>,
    description: Option<String>,
    service: Option<String>,
    project_url: Option<String>,
    technologies: Option<String>,
    file: Option<UploadPayload>,
    thumbnail: Option<UploadPayload>,
    remove_thumbnail: bool,
}

async fn read_portfolio_form(mut multipart: Multipart) -> Result<PortfolioForm, ApiError> {
    let mut form = PortfolioForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("title") => form.title = Some(read_text(field).await?),
            Some("description") => form.description = Some(read_text(field).await?),
            Some("service") => form.service = Some(read_text(field).await?),
            Some("projectUrl") => form.project_url = Some(read_text(field).await?),
            Some("technologies") => form.technologies = Some(read_text(field).await?),
            Some("file") => form.file = read_file(field).await?,
            Some("thumbnail") => form.thumbnail = read_file(field).await?,
            Some("removeThumbnail") => {
                form.remove_thumbnail = read_text(field).await? == "true";
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read form field: {e}")))
}

/// Browsers submit an empty file part when nothing was selected; treat that
/// as no file.
async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<UploadPayload>, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read uploaded file: {e}")))?;

    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadPayload {
        filename,
        bytes: bytes.to_vec(),
    }))
}

/// GET /portfolio/items
/// Public listing, newest first, optionally filtered by service.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ApiResponse<Vec<PortfolioItemDto>>>, ApiError> {
    let service = query
        .service
        .as_deref()
        .map(validate_service)
        .transpose()?;

    let items = state.store.list_portfolio_items(service).await?;
    let dtos: Vec<PortfolioItemDto> = items.into_iter().map(PortfolioItemDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /portfolio/items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PortfolioItemDto>>, ApiError> {
    let id = validate_item_id(id)?;

    let item = state
        .store
        .get_portfolio_item(id)
        .await?
        .ok_or_else(ApiError::item_not_found)?;

    Ok(Json(ApiResponse::success(PortfolioItemDto::from(item))))
}

/// POST /portfolio/items
/// Create a portfolio item from a multipart form. The primary file upload
/// must succeed before anything is written; a failed thumbnail upload is
/// tolerated.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PortfolioItemDto>>), ApiError> {
    state
        .cloudinary
        .ensure_configured()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let form = read_portfolio_form(multipart).await?;

    let (Some(title), Some(description), Some(service), Some(file)) =
        (form.title, form.description, form.service, form.file)
    else {
        return Err(ApiError::validation("Missing required fields"));
    };

    let service = validate_service(&service)?;
    let title = validate_title(&title)?;
    let description = validate_description(&description)?;

    let technologies = form
        .technologies
        .as_deref()
        .map(parse_technologies)
        .unwrap_or_default();

    let item = state
        .portfolio_service
        .create(CreatePortfolioItem {
            service,
            title,
            description,
            project_url: form.project_url.filter(|u| !u.is_empty()),
            technologies,
            file,
            thumbnail: form.thumbnail,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            PortfolioItemDto::from(item),
            "Portfolio item created successfully",
        )),
    ))
}

/// PUT /portfolio/items/{id}
/// Update an item. A new primary file replaces the stored asset (the old
/// one is deleted at the host first); `removeThumbnail=true` drops the
/// thumbnail without replacement.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PortfolioItemDto>>, ApiError> {
    let id = validate_item_id(id)?;

    let form = read_portfolio_form(multipart).await?;

    let (Some(title), Some(description)) = (form.title, form.description) else {
        return Err(ApiError::validation("Missing required fields"));
    };

    let title = validate_title(&title)?;
    let description = validate_description(&description)?;

    // Only replacement uploads need the host; thumbnail removal is
    // best-effort cleanup and proceeds regardless.
    if form.file.is_some() || form.thumbnail.is_some() {
        state
            .cloudinary
            .ensure_configured()
            .map_err(|e| ApiError::internal(e.to_string()))?;
    }

    let updated = state
        .portfolio_service
        .update(
            id,
            UpdatePortfolioItem {
                title,
                description,
                project_url: form.project_url.filter(|u| !u.is_empty()),
                technologies: form.technologies.as_deref().map(parse_technologies),
                file: form.file,
                thumbnail: form.thumbnail,
                remove_thumbnail: form.remove_thumbnail,
            },
        )
        .await?
        .ok_or_else(ApiError::item_not_found)?;

    Ok(Json(ApiResponse::success(PortfolioItemDto::from(updated))))
}

/// DELETE /portfolio/items/{id}
/// Asset deletion at the host is best-effort; the record always goes.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_item_id(id)?;

    let deleted = state.portfolio_service.delete(id).await?;
    if deleted {
        Ok(Json(ApiResponse::message(
            "Portfolio item deleted successfully",
        )))
    } else {
        Err(ApiError::item_not_found())
    }
}
