use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    pub asset_host: AssetHostConfig,

    pub mail: MailConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/revoult.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Session inactivity expiry in minutes.
    pub session_expiry_minutes: i64,

    /// Maximum multipart upload body size in bytes (default: 100 MB).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4567,
            cors_allowed_origins: vec![
                "http://localhost:4567".to_string(),
                "http://127.0.0.1:4567".to_string(),
            ],
            secure_cookies: true,
            session_expiry_minutes: 60,
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Credentials and endpoint for the media asset host.
///
/// The three credential keys are normally supplied through the environment
/// (`CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`);
/// requests that need the host fail with a message naming whichever keys are
/// missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetHostConfig {
    pub cloud_name: String,

    pub api_key: String,

    #[serde(skip_serializing)]
    pub api_secret: String,

    pub base_url: String,

    /// Client-side upload timeout in seconds (default: 30)
    pub upload_timeout_seconds: u64,
}

impl Default for AssetHostConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://api.cloudinary.com".to_string(),
            upload_timeout_seconds: 30,
        }
    }
}

impl AssetHostConfig {
    /// Names of the credential keys that are unset, in a stable order.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.cloud_name.is_empty() {
            missing.push("CLOUDINARY_CLOUD_NAME");
        }
        if self.api_key.is_empty() {
            missing.push("CLOUDINARY_API_KEY");
        }
        if self.api_secret.is_empty() {
            missing.push("CLOUDINARY_API_SECRET");
        }
        missing
    }
}

/// Outbound mail relay credentials. Supplied through the environment
/// (`SMTP_USER`, `SMTP_APP_PASSWORD`) like the asset-host keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,

    pub user: String,

    #[serde(skip_serializing)]
    pub app_password: String,

    /// Where contact-form submissions are delivered. Defaults to `user`.
    pub recipient: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            user: String::new(),
            app_password: String::new(),
            recipient: String::new(),
        }
    }
}

impl MailConfig {
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user.is_empty() {
            missing.push("SMTP_USER");
        }
        if self.app_password.is_empty() {
            missing.push("SMTP_APP_PASSWORD");
        }
        missing
    }

    /// Delivery address for relayed messages.
    #[must_use]
    pub fn recipient(&self) -> &str {
        if self.recipient.is_empty() {
            &self.user
        } else {
            &self.recipient
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            asset_host: AssetHostConfig::default(),
            mail: MailConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Secrets may live in a .env file next to the binary.
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables take precedence over the config file for the
    /// connection string and the credential keys.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            self.general.database_path = url;
        }
        if let Ok(v) = std::env::var("CLOUDINARY_CLOUD_NAME")
            && !v.is_empty()
        {
            self.asset_host.cloud_name = v;
        }
        if let Ok(v) = std::env::var("CLOUDINARY_API_KEY")
            && !v.is_empty()
        {
            self.asset_host.api_key = v;
        }
        if let Ok(v) = std::env::var("CLOUDINARY_API_SECRET")
            && !v.is_empty()
        {
            self.asset_host.api_secret = v;
        }
        if let Ok(v) = std::env::var("SMTP_USER")
            && !v.is_empty()
        {
            self.mail.user = v;
        }
        if let Ok(v) = std::env::var("SMTP_APP_PASSWORD")
            && !v.is_empty()
        {
            self.mail.app_password = v;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("revoult").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".revoult").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.max_db_connections == 0 {
            anyhow::bail!("general.max_db_connections must be at least 1");
        }
        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be non-zero");
        }
        Ok(())
    }
}
