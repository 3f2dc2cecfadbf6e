//! Process configuration, read from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `WOLFSHIELD_BIND_ADDR` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `WOLFSHIELD_DB_MAX_CONNECTIONS` | `10` |
//! | `JWT_SECRET` | insecure dev secret |
//! | `WOLFSHIELD_VERIFY_PAGE_SIZE` | `500` |

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::ledger_store::ChainPage;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub verify_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(get("WOLFSHIELD_BIND_ADDR"), "WOLFSHIELD_BIND_ADDR", || {
            SocketAddr::from(([0, 0, 0, 0], 8080))
        })?;
        let db_max_connections: u32 = parse_or(
            get("WOLFSHIELD_DB_MAX_CONNECTIONS"),
            "WOLFSHIELD_DB_MAX_CONNECTIONS",
            || 10,
        )?;
        let verify_page_size: u32 = parse_or(
            get("WOLFSHIELD_VERIFY_PAGE_SIZE"),
            "WOLFSHIELD_VERIFY_PAGE_SIZE",
            || ChainPage::DEFAULT_LIMIT,
        )?;
        if verify_page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "WOLFSHIELD_VERIFY_PAGE_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            db_max_connections,
            jwt_secret,
            verify_page_size,
        })
    }
}

fn parse_or<T>(
    raw: Option<String>,
    var: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default()),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.verify_page_size, 500);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("WOLFSHIELD_BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/wolfshield"),
            ("WOLFSHIELD_DB_MAX_CONNECTIONS", "4"),
            ("JWT_SECRET", "s3cret"),
            ("WOLFSHIELD_VERIFY_PAGE_SIZE", "50"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/wolfshield"));
        assert_eq!(cfg.db_max_connections, 4);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.verify_page_size, 50);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = config(&[("WOLFSHIELD_DB_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "WOLFSHIELD_DB_MAX_CONNECTIONS", .. }
        ));

        let err = config(&[("WOLFSHIELD_VERIFY_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "WOLFSHIELD_VERIFY_PAGE_SIZE", .. }));
    }
}
