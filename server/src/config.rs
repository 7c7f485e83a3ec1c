//! Runtime configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default ceiling for a whole upload request body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const DEFAULT_DATABASE_URL: &str = "recipes.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DB_POOL_SIZE: u32 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Directory holding uploaded images.
    pub upload_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let upload_dir =
            PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()));

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value,
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: "BIND_ADDR",
                    value: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_UPLOAD_BYTES",
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let db_pool_size = match lookup("DB_POOL_SIZE") {
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_POOL_SIZE",
                        value,
                    })
                }
            },
            None => DEFAULT_DB_POOL_SIZE,
        };

        Ok(Config {
            database_url,
            upload_dir,
            bind_addr,
            max_upload_bytes,
            db_pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_url, "recipes.db");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.db_pool_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "/tmp/test.db"),
            ("UPLOAD_DIR", "/tmp/uploads"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("DB_POOL_SIZE", "2"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/test.db");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.db_pool_size, 2);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = Config::from_lookup(lookup_from(&[("BIND_ADDR", "not an address")]))
            .unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }

    #[test]
    fn test_invalid_upload_limit() {
        assert!(Config::from_lookup(lookup_from(&[("MAX_UPLOAD_BYTES", "lots")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("MAX_UPLOAD_BYTES", "0")])).is_err());
    }

    #[test]
    fn test_invalid_pool_size() {
        assert!(Config::from_lookup(lookup_from(&[("DB_POOL_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DB_POOL_SIZE", "-3")])).is_err());
    }
}
