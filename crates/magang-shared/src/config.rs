//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SESSION_TTL_SECONDS,
    DEFAULT_UPLOAD_DIR, DEFAULT_UPLOAD_PUBLIC_PATH,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub upload: UploadSettings,
    pub cors: CorsSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub session_ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    pub dir: String,
    pub max_bytes: usize,
    pub public_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    /// `json` or `pretty`
    pub format: String,
    /// Optional directory for daily rolling log files.
    pub dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;
        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "magang-server")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", DEFAULT_MAX_CONNECTIONS)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.session_ttl_seconds", DEFAULT_SESSION_TTL_SECONDS)?
            .set_default("upload.dir", DEFAULT_UPLOAD_DIR)?
            .set_default("upload.max_bytes", DEFAULT_MAX_UPLOAD_BYTES as u64)?
            .set_default("upload.public_path", DEFAULT_UPLOAD_PUBLIC_PATH)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("log.format", "json")
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::MissingSetting("database.url"));
        }
        if self.jwt.secret.trim().is_empty() {
            return Err(AppError::MissingSetting("jwt.secret"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_with_required_overrides() {
        let config: AppConfig = AppConfig::builder()
            .unwrap()
            .set_override("database.url", "postgres://localhost/magang")
            .unwrap()
            .set_override("jwt.secret", "rahasia")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.session_ttl_seconds, 7 * 24 * 3600);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.log.dir.is_none());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let config: AppConfig = AppConfig::builder()
            .unwrap()
            .set_override("database.url", "postgres://localhost/magang")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(matches!(
            config.validate(),
            Err(AppError::MissingSetting("jwt.secret"))
        ));
    }
}
