// src/core/config_manager.rs
//! Configuration loading: `config.yaml` for paths and switches, env for secrets.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::FsOps;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub auth: AuthSettings,
    pub mail: MailSettings,
    pub scheduler: SchedulerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub data_path: PathBuf,
    pub database_path: PathBuf,
    pub reports_path: PathBuf,
    #[serde(default)]
    pub scheduler_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

/// Session lifetime bounds, in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub resend_api_key: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub current_signing_key: String,
    pub next_signing_key: String,
}

impl ConfigManager {
    /// Load `config.yaml` from the working directory plus env secrets.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yaml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let env_name = Self::environment_name();
        info!("Loading configuration for environment: {}", env_name);

        let environment = Self::load_environment(config_path, &env_name)?;
        let scheduler = SchedulerSettings {
            enabled: environment.scheduler_enabled,
            current_signing_key: std::env::var("QSTASH_CURRENT_SIGNING_KEY").unwrap_or_default(),
            next_signing_key: std::env::var("QSTASH_NEXT_SIGNING_KEY").unwrap_or_default(),
        };

        Ok(Self {
            environment,
            auth: Self::load_auth(&env_name)?,
            mail: Self::load_mail(),
            scheduler,
        })
    }

    fn environment_name() -> String {
        std::env::var("JOBLYST_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_environment(config_path: &Path, env_name: &str) -> Result<EnvironmentConfig> {
        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. Server cannot start without configuration.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let env_config = match env_name {
            "production" => file.production,
            _ => file.local,
        };

        let base = std::env::current_dir().context("Failed to get current directory")?;
        Ok(EnvironmentConfig {
            data_path: FsOps::normalize_path(&base, &env_config.data_path),
            database_path: FsOps::normalize_path(&base, &env_config.database_path),
            reports_path: FsOps::normalize_path(&base, &env_config.reports_path),
            scheduler_enabled: env_config.scheduler_enabled,
        })
    }

    fn load_auth(env_name: &str) -> Result<AuthSettings> {
        let jwt_secret = match std::env::var("JOBLYST_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if env_name == "production" => {
                anyhow::bail!("JOBLYST_JWT_SECRET must be set in production")
            }
            Err(_) => {
                tracing::warn!("JOBLYST_JWT_SECRET not set, using development secret");
                "joblyst-dev-secret".to_string()
            }
        };

        let token_ttl_hours = parse_token_ttl(std::env::var("JOBLYST_TOKEN_TTL_HOURS").ok().as_deref())?;

        Ok(AuthSettings {
            jwt_secret,
            token_ttl_hours,
        })
    }

    fn load_mail() -> MailSettings {
        MailSettings {
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            from_address: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Joblyst <notifications@joblyst.app>".to_string()),
        }
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.environment.data_path).await?;
        FsOps::ensure_dir_exists(&self.environment.reports_path).await?;

        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        Ok(())
    }
}

/// `JOBLYST_TOKEN_TTL_HOURS` must be a whole number of hours in `1..=MAX_TOKEN_TTL_HOURS`.
fn parse_token_ttl(raw: Option<&str>) -> Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_TOKEN_TTL_HOURS);
    };

    let hours: i64 = raw
        .parse()
        .with_context(|| format!("JOBLYST_TOKEN_TTL_HOURS is not a number: {}", raw))?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "JOBLYST_TOKEN_TTL_HOURS must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_HOURS,
            hours
        );
    }
    Ok(hours)
}
