// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Which comment store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// In-process store; contents are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub pg_pool_max: u32,
    pub http_port: u16,
    pub rust_log: String,
    pub swagger_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Postgres,
            database_url: None,
            pg_pool_max: 5,
            http_port: 8080,
            rust_log: "info".to_string(),
            swagger_enabled: false,
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let defaults = Config::default();

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.storage,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set for the postgres backend".to_string());
        }

        let pg_pool_max = parse_or("PG_POOL_MAX", defaults.pg_pool_max);
        let http_port = parse_or("HTTP_PORT", defaults.http_port);
        let swagger_enabled = parse_or("SWAGGER_ENABLED", defaults.swagger_enabled);

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            storage,
            database_url,
            pg_pool_max,
            http_port,
            rust_log,
            swagger_enabled,
            cors_origins,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
