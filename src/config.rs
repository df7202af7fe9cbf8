use std::env;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::application::checkout_service::PricingPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub pricing_policy: PricingPolicy,
    pub restock_on_cancel: bool,
    pub verification_code_ttl: Duration,
    pub db_pool_size: u32,
}

impl AppConfig {
    /// Reads the configuration from the process environment, after loading a
    /// `.env` file when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 8080)?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: Duration::seconds(parsed(&lookup, "ACCESS_TOKEN_TTL_SECS", 3600)?),
            refresh_token_ttl: Duration::seconds(parsed(
                &lookup,
                "REFRESH_TOKEN_TTL_SECS",
                604_800,
            )?),
            pricing_policy: match lookup("PRICING_POLICY") {
                None => PricingPolicy::default(),
                Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    key: "PRICING_POLICY",
                    value,
                })?,
            },
            restock_on_cancel: parsed(&lookup, "RESTOCK_ON_CANCEL", false)?,
            verification_code_ttl: Duration::seconds(parsed(
                &lookup,
                "VERIFICATION_CODE_TTL_SECS",
                600,
            )?),
            db_pool_size: parsed(&lookup, "DB_POOL_SIZE", 10)?,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
