use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// `DATABASE_URL` value that selects the in-process store instead of MySQL.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_register_per_min: u32,
    pub rate_scan_per_min: u32,
    pub rate_public_per_min: u32,

    // Student lookup cache
    pub student_cache_ttl_secs: u64,
    pub student_cache_capacity: u64,

    // Logging
    pub log_dir: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: MEMORY_DATABASE_URL.to_string(),
            server_addr: "127.0.0.1:8080".to_string(),
            api_prefix: "/api".to_string(),
            rate_register_per_min: 30,
            rate_scan_per_min: 120,
            rate_public_per_min: 1000,
            student_cache_ttl_secs: 86400, // 24h
            student_cache_capacity: 100_000,
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),

            rate_register_per_min: parse_or("RATE_REGISTER_PER_MIN", defaults.rate_register_per_min)?,
            rate_scan_per_min: parse_or("RATE_SCAN_PER_MIN", defaults.rate_scan_per_min)?,
            rate_public_per_min: parse_or("RATE_PUBLIC_PER_MIN", defaults.rate_public_per_min)?,

            student_cache_ttl_secs: parse_or("STUDENT_CACHE_TTL_SECS", defaults.student_cache_ttl_secs)?,
            student_cache_capacity: parse_or("STUDENT_CACHE_CAPACITY", defaults.student_cache_capacity)?,

            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a number, got {raw:?}"))
}
