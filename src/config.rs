use std::env;

use thiserror::Error;

use crate::domain::order::CreationPolicy;
use crate::infrastructure::stripe::DEFAULT_API_BASE;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub creation_policy: CreationPolicy,
}

impl Config {
    /// Read configuration from the process environment (after `.env` has
    /// been loaded by the caller).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => 8080,
        };

        let creation_policy = match lookup("ORDER_CREATION_POLICY") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "ORDER_CREATION_POLICY",
                value,
            })?,
            None => CreationPolicy::default(),
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_api_base: lookup("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            creation_policy,
        })
    }
}
