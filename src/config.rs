use crate::cache::CachePolicy;
use crate::engine::EngineSettings;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Redis connection string; the in-process cache is used when absent.
    pub redis_url: Option<String>,
    pub store_timeout_ms: u64,
    pub cache_timeout_ms: u64,
    pub cache_ttl_reference_secs: u64,
    pub cache_ttl_aggregate_secs: u64,
    pub cache_ttl_list_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let redis_url = env_map
            .get("REDIS_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let store_timeout_ms = positive_u64(&env_map, "STORE_TIMEOUT_MS", 2000)?;
        let cache_timeout_ms = positive_u64(&env_map, "CACHE_TIMEOUT_MS", 50)?;
        let cache_ttl_reference_secs = positive_u64(&env_map, "CACHE_TTL_REFERENCE_SECS", 21600)?;
        let cache_ttl_aggregate_secs = positive_u64(&env_map, "CACHE_TTL_AGGREGATE_SECS", 1800)?;
        let cache_ttl_list_secs = positive_u64(&env_map, "CACHE_TTL_LIST_SECS", 900)?;

        Ok(Config {
            port,
            database_path,
            redis_url,
            store_timeout_ms,
            cache_timeout_ms,
            cache_ttl_reference_secs,
            cache_ttl_aggregate_secs,
            cache_ttl_list_secs,
        })
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            op_timeout: Duration::from_millis(self.cache_timeout_ms),
            reference_ttl: Duration::from_secs(self.cache_ttl_reference_secs),
            aggregate_ttl: Duration::from_secs(self.cache_ttl_aggregate_secs),
            list_ttl: Duration::from_secs(self.cache_ttl_list_secs),
            ..CachePolicy::default()
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }
}

fn positive_u64(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                "must be a positive integer".to_string(),
            )),
        },
    }
}
