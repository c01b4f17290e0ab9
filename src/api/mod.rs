use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::clients::CloudinaryClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{ContactService, PortfolioService};

mod assets;
pub mod auth;
mod contact;
mod error;
mod observability;
mod portfolio;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub cloudinary: Arc<CloudinaryClient>,

    pub portfolio_service: Arc<PortfolioService>,

    pub contact_service: Arc<ContactService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let cloudinary = Arc::new(CloudinaryClient::new(config.asset_host.clone())?);
    let portfolio_service = Arc::new(PortfolioService::new(store.clone(), cloudinary.clone()));
    let contact_service = Arc::new(ContactService::new(config.mail.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        cloudinary,
        portfolio_service,
        contact_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let secure_cookies = state.config.server.secure_cookies;
    let session_expiry = state.config.server.session_expiry_minutes;
    let max_upload_bytes = state.config.server.max_upload_bytes;

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_expiry,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/portfolio/items", get(portfolio::list_items))
        .route("/portfolio/items/{id}", get(portfolio::get_item))
        .route("/contact", post(contact::submit))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio/items", post(portfolio::create_item))
        .route("/portfolio/items/{id}", put(portfolio::update_item))
        .route("/portfolio/items/{id}", delete(portfolio::delete_item))
        .route("/admin/users", get(users::list_users))
        .route("/admin/users", post(users::create_user))
        .route("/admin/users/{id}", get(users::get_user))
        .route("/admin/users/{id}", put(users::update_user))
        .route("/admin/users/{id}", delete(users::delete_user))
        .route("/auth/me", get(auth::get_current_user))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
