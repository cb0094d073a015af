use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// True when ENVIRONMENT=prod. Services use this to decide whether missing
/// environment variables are fatal or fall back to defaults.
pub fn is_production() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

/// Read an environment variable with an optional default.
///
/// In production a missing variable is a hard configuration error even when a
/// default exists; in development the default applies.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    if let Ok(value) = env::var(key) {
        return Ok(value);
    }

    if is_prod {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        )));
    }

    default.map(str::to_string).ok_or_else(|| {
        AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
    })
}
