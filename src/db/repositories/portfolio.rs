use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::portfolio_items;
use crate::models::{FileKind, ServiceCategory};

/// Field set for inserting a new portfolio item. Asset URLs/handles come
/// from the upload that already succeeded.
#[derive(Debug, Clone)]
pub struct NewPortfolioItem {
    pub service: ServiceCategory,
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub public_id: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub project_url: Option<String>,
    pub file_type: FileKind,
    pub technologies: Vec<String>,
}

/// Scalar + asset changes applied to an existing item. `None` leaves the
/// stored value untouched; the thumbnail pair is `Some(None)` when the
/// thumbnail is being removed.
#[derive(Debug, Clone, Default)]
pub struct PortfolioItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_url: Option<Option<String>>,
    pub technologies: Option<Vec<String>>,
    pub file: Option<(String, String)>,
    pub thumbnail: Option<Option<(String, String)>>,
}

pub struct PortfolioRepository {
    conn: DatabaseConnection,
}

impl PortfolioRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, item: NewPortfolioItem) -> Result<portfolio_items::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = portfolio_items::ActiveModel {
            service: Set(item.service.as_str().to_string()),
            title: Set(item.title),
            description: Set(item.description),
            file_url: Set(item.file_url),
            public_id: Set(item.public_id),
            thumbnail_url: Set(item.thumbnail_url),
            thumbnail_public_id: Set(item.thumbnail_public_id),
            project_url: Set(item.project_url),
            file_type: Set(item.file_type.as_str().to_string()),
            technologies: Set(serde_json::to_string(&item.technologies).ok()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert portfolio item")?;

        info!(id = model.id, service = %model.service, "Added portfolio item: {}", model.title);
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<portfolio_items::Model>> {
        portfolio_items::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query portfolio item")
    }

    /// All items, newest first, optionally restricted to one service.
    pub async fn list(
        &self,
        service: Option<ServiceCategory>,
    ) -> Result<Vec<portfolio_items::Model>> {
        let mut query = portfolio_items::Entity::find()
            .order_by_desc(portfolio_items::Column::CreatedAt)
            .order_by_desc(portfolio_items::Column::Id);

        if let Some(service) = service {
            query = query.filter(portfolio_items::Column::Service.eq(service.as_str()));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list portfolio items")
    }

    pub async fn update(
        &self,
        existing: portfolio_items::Model,
        changes: PortfolioItemChanges,
    ) -> Result<portfolio_items::Model> {
        let mut active: portfolio_items::ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(project_url) = changes.project_url {
            active.project_url = Set(project_url);
        }
        if let Some(technologies) = changes.technologies {
            active.technologies = Set(serde_json::to_string(&technologies).ok());
        }
        if let Some((url, public_id)) = changes.file {
            active.file_url = Set(url);
            active.public_id = Set(public_id);
        }
        match changes.thumbnail {
            Some(Some((url, public_id))) => {
                active.thumbnail_url = Set(Some(url));
                active.thumbnail_public_id = Set(Some(public_id));
            }
            Some(None) => {
                active.thumbnail_url = Set(None);
                active.thumbnail_public_id = Set(None);
            }
            None => {}
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update portfolio item")
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = portfolio_items::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete portfolio item")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed portfolio item with ID: {}", id);
        }
        Ok(removed)
    }

    pub async fn count(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        portfolio_items::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count portfolio items")
    }
}
