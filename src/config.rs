use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::store::RestStoreConfig;
use crate::toast::DEFAULT_TOAST_TTL;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Set when `STORE_URL` is present; scheduled lectures then live in the
    /// hosted store instead of the local database.
    pub remote_store: Option<RestStoreConfig>,
    pub toast_ttl: Duration,
    pub sweep_interval_secs: u64,
    /// Cached schedule lists older than this are dropped by the sweeper.
    pub cache_max_age_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://study_planner.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("invalid BIND_ADDR: {}", e)))?;

        let remote_store = if env::var("STORE_URL").is_ok() {
            Some(RestStoreConfig::new_from_env()?)
        } else {
            None
        };

        let toast_ttl = match env::var("TOAST_TTL_SECS") {
            Ok(raw) => Duration::from_secs(parse_secs("TOAST_TTL_SECS", &raw)?),
            Err(_) => DEFAULT_TOAST_TTL,
        };

        let sweep_interval_secs = match env::var("SWEEP_INTERVAL_SECS") {
            Ok(raw) => parse_secs("SWEEP_INTERVAL_SECS", &raw)?,
            Err(_) => 30,
        };

        let cache_max_age_secs = match env::var("CACHE_MAX_AGE_SECS") {
            Ok(raw) => parse_secs("CACHE_MAX_AGE_SECS", &raw)?,
            Err(_) => 300,
        };

        Ok(Self {
            database_url,
            bind_addr,
            remote_store,
            toast_ttl,
            sweep_interval_secs,
            cache_max_age_secs,
        })
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::Config(format!("{} must be a number of seconds, got {:?}", name, raw)))
}
