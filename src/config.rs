use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::attendance::classifier::{CheckInWindow, DEFAULT_WINDOW_MINUTES};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    pub check_in_window: CheckInWindow,

    // Lecture schedule cache
    pub lecture_cache_ttl: Duration,
    pub lecture_warmup_days: u32,

    // Rate limiting
    pub rate_check_in_per_min: u32,
    pub rate_api_per_min: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let window_minutes = parse_or(&lookup, "CHECK_IN_WINDOW_MINUTES", DEFAULT_WINDOW_MINUTES)?;
        let check_in_window = CheckInWindow::new(window_minutes)
            .ok_or_else(|| anyhow!("CHECK_IN_WINDOW_MINUTES must be positive"))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            check_in_window,

            lecture_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "LECTURE_CACHE_TTL_SECS",
                3600,
            )?),
            lecture_warmup_days: parse_or(&lookup, "LECTURE_WARMUP_DAYS", 7)?,

            rate_check_in_per_min: parse_or(&lookup, "RATE_CHECK_IN_PER_MIN", 600)?,
            rate_api_per_min: parse_or(&lookup, "RATE_API_PER_MIN", 1000)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
