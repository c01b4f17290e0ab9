use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::portfolio_items;
use crate::models::ServiceCategory;

pub mod migrator;
pub mod repositories;

pub use repositories::portfolio::{NewPortfolioItem, PortfolioItemChanges};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn portfolio_repo(&self) -> repositories::portfolio::PortfolioRepository {
        repositories::portfolio::PortfolioRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========== Portfolio Repository Methods ==========

    pub async fn add_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<portfolio_items::Model> {
        self.portfolio_repo().insert(item).await
    }

    pub async fn get_portfolio_item(&self, id: i32) -> Result<Option<portfolio_items::Model>> {
        self.portfolio_repo().get(id).await
    }

    pub async fn list_portfolio_items(
        &self,
        service: Option<ServiceCategory>,
    ) -> Result<Vec<portfolio_items::Model>> {
        self.portfolio_repo().list(service).await
    }

    pub async fn update_portfolio_item(
        &self,
        existing: portfolio_items::Model,
        changes: PortfolioItemChanges,
    ) -> Result<portfolio_items::Model> {
        self.portfolio_repo().update(existing, changes).await
    }

    pub async fn remove_portfolio_item(&self, id: i32) -> Result<bool> {
        self.portfolio_repo().remove(id).await
    }

    pub async fn portfolio_item_count(&self) -> Result<u64> {
        self.portfolio_repo().count().await
    }

    // ========== User Repository Methods ==========

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(email, password, config).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        email: Option<&str>,
        password: Option<&str>,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().update(id, email, password, config).await
    }

    pub async fn remove_user(&self, id: i32) -> Result<bool> {
        self.user_repo().remove(id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn user_count(&self) -> Result<u64> {
        self.user_repo().count().await
    }
}
