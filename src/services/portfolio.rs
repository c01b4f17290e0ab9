use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::clients::CloudinaryClient;
use crate::db::{NewPortfolioItem, PortfolioItemChanges, Store};
use crate::entities::portfolio_items;
use crate::models::{FileKind, ServiceCategory};

/// One file lifted out of the multipart form.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Validated input for creating a portfolio item.
#[derive(Debug)]
pub struct CreatePortfolioItem {
    pub service: ServiceCategory,
    pub title: String,
    pub description: String,
    pub project_url: Option<String>,
    pub technologies: Vec<String>,
    pub file: UploadPayload,
    pub thumbnail: Option<UploadPayload>,
}

/// Validated input for updating a portfolio item.
#[derive(Debug)]
pub struct UpdatePortfolioItem {
    pub title: String,
    pub description: String,
    pub project_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub file: Option<UploadPayload>,
    pub thumbnail: Option<UploadPayload>,
    pub remove_thumbnail: bool,
}

/// Orchestrates the upload/replace/cleanup flow between the asset host and
/// the database. Uploads happen before any row is written; asset deletions
/// are best-effort and never block the database write.
pub struct PortfolioService {
    store: Store,
    cloudinary: Arc<CloudinaryClient>,
}

impl PortfolioService {
    #[must_use]
    pub const fn new(store: Store, cloudinary: Arc<CloudinaryClient>) -> Self {
        Self { store, cloudinary }
    }

    pub async fn create(&self, input: CreatePortfolioItem) -> Result<portfolio_items::Model> {
        let file_type = input.service.file_kind();

        let asset = self
            .cloudinary
            .upload(
                input.file.bytes,
                &input.file.filename,
                &input.service.upload_folder(),
                file_type,
            )
            .await
            .context("File upload failed")?;

        // A failed thumbnail upload is tolerated; the item is written
        // without one.
        let thumbnail = if let Some(thumb) = input.thumbnail {
            match self
                .cloudinary
                .upload(
                    thumb.bytes,
                    &thumb.filename,
                    &input.service.thumbnail_folder(),
                    FileKind::Image,
                )
                .await
            {
                Ok(asset) => Some(asset),
                Err(e) => {
                    warn!("Thumbnail upload failed, continuing without: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        self.store
            .add_portfolio_item(NewPortfolioItem {
                service: input.service,
                title: input.title,
                description: input.description,
                file_url: asset.url,
                public_id: asset.public_id,
                thumbnail_url: thumbnail.as_ref().map(|t| t.url.clone()),
                thumbnail_public_id: thumbnail.map(|t| t.public_id),
                project_url: input.project_url,
                file_type,
                technologies: input.technologies,
            })
            .await
    }

    /// Returns `Ok(None)` when the item does not exist.
    pub async fn update(
        &self,
        id: i32,
        input: UpdatePortfolioItem,
    ) -> Result<Option<portfolio_items::Model>> {
        let Some(existing) = self.store.get_portfolio_item(id).await? else {
            return Ok(None);
        };

        let service = ServiceCategory::from_str(&existing.service)
            .map_err(|()| anyhow::anyhow!("Stored item has unknown service: {}", existing.service))?;
        let file_type =
            FileKind::from_str(&existing.file_type).unwrap_or_else(|()| service.file_kind());

        let mut changes = PortfolioItemChanges {
            title: Some(input.title),
            description: Some(input.description),
            project_url: Some(input.project_url),
            technologies: input.technologies,
            ..Default::default()
        };

        if let Some(file) = input.file {
            // Invalidate the previous asset before storing the replacement.
            self.destroy_best_effort(&existing.public_id, file_type).await;

            let asset = self
                .cloudinary
                .upload(
                    file.bytes,
                    &file.filename,
                    &service.upload_folder(),
                    file_type,
                )
                .await
                .context("File upload failed")?;
            changes.file = Some((asset.url, asset.public_id));
        }

        if let Some(thumb) = input.thumbnail {
            if let Some(old) = existing.thumbnail_public_id.as_deref() {
                self.destroy_best_effort(old, FileKind::Image).await;
            }

            let asset = self
                .cloudinary
                .upload(
                    thumb.bytes,
                    &thumb.filename,
                    &service.thumbnail_folder(),
                    FileKind::Image,
                )
                .await
                .context("Thumbnail upload failed")?;
            changes.thumbnail = Some(Some((asset.url, asset.public_id)));
        } else if input.remove_thumbnail {
            if let Some(old) = existing.thumbnail_public_id.as_deref() {
                self.destroy_best_effort(old, FileKind::Image).await;
            }
            changes.thumbnail = Some(None);
        }

        let updated = self.store.update_portfolio_item(existing, changes).await?;
        Ok(Some(updated))
    }

    /// Returns `Ok(false)` when the item does not exist. Asset deletion at
    /// the host never blocks removing the row.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let Some(existing) = self.store.get_portfolio_item(id).await? else {
            return Ok(false);
        };

        let file_type = FileKind::from_str(&existing.file_type).unwrap_or(FileKind::Image);

        self.destroy_best_effort(&existing.public_id, file_type).await;
        if let Some(thumb) = existing.thumbnail_public_id.as_deref() {
            self.destroy_best_effort(thumb, FileKind::Image).await;
        }

        self.store.remove_portfolio_item(id).await
    }

    async fn destroy_best_effort(&self, public_id: &str, kind: FileKind) {
        if let Err(e) = self.cloudinary.destroy(public_id, kind).await {
            warn!(public_id = %public_id, "Failed to delete asset at host: {e:#}");
        }
    }
}
