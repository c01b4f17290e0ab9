use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "portfolio_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One of the four fixed service categories (kebab-case).
    pub service: String,

    pub title: String,

    pub description: String,

    /// Delivery URL of the primary asset at the host.
    pub file_url: String,

    /// Asset-host handle needed to delete the primary asset later.
    pub public_id: String,

    pub thumbnail_url: Option<String>,

    pub thumbnail_public_id: Option<String>,

    pub project_url: Option<String>,

    /// "image" or "video", derived from the service category at creation.
    pub file_type: String,

    /// JSON array of technology tags.
    pub technologies: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
