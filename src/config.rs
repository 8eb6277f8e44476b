// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into an
//! immutable [`ServerConfig`]. Request-handling code never touches the
//! environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret for signing and verifying credentials | **Required** |
//! | `TOKEN_TTL_SECS` | Lifetime of issued credentials | `2592000` (30 days) |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the JSON account store | unset (in-memory) |
//! | `REJECT_INACTIVE_ACCOUNTS` | Refuse deactivated accounts at the gate | `false` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key | unset (plain HTTP) |
//! | `SEED_SUPERADMIN_EMAIL` / `SEED_SUPERADMIN_PASSWORD` | Bootstrap superadmin | unset |
//! | `SEED_SUPERADMIN_NAME` | Display name of the bootstrap superadmin | `Superadmin` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::SigningSecret;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the account data directory.
///
/// When unset, accounts live in memory and vanish on restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const REJECT_INACTIVE_ENV: &str = "REJECT_INACTIVE_ACCOUNTS";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const SEED_EMAIL_ENV: &str = "SEED_SUPERADMIN_EMAIL";
pub const SEED_PASSWORD_ENV: &str = "SEED_SUPERADMIN_PASSWORD";
pub const SEED_NAME_ENV: &str = "SEED_SUPERADMIN_NAME";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default credential lifetime: 30 days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Startup configuration error. Every variant is fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
    #[error("SEED_SUPERADMIN_EMAIL and SEED_SUPERADMIN_PASSWORD must be set together")]
    IncompleteSeed,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` from the process environment.
    ///
    /// Unknown values fall back to pretty; logging is initialized before
    /// the rest of the configuration is validated.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Bootstrap superadmin created at startup when absent.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Immutable server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub secret: SigningSecret,
    pub token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
    pub reject_inactive: bool,
    pub tls: Option<TlsPaths>,
    pub seed: Option<SeedAccount>,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret = var(JWT_SECRET_ENV)
            .and_then(SigningSecret::new)
            .ok_or(ConfigError::MissingSecret)?;

        let token_ttl = match var(TOKEN_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(invalid(TOKEN_TTL_ENV, raw)),
            },
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        };

        let host: IpAddr = match var(HOST_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| invalid(HOST_ENV, raw))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port: u16 = match var(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| invalid(PORT_ENV, raw))?,
            None => DEFAULT_PORT,
        };

        let reject_inactive = match var(REJECT_INACTIVE_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid(REJECT_INACTIVE_ENV, raw))?,
            None => false,
        };

        let tls = match (var(TLS_CERT_ENV), var(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let seed = match (var(SEED_EMAIL_ENV), lookup(SEED_PASSWORD_ENV)) {
            (Some(email), Some(password)) if !password.is_empty() => Some(SeedAccount {
                name: var(SEED_NAME_ENV).unwrap_or_else(|| "Superadmin".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteSeed),
        };

        Ok(Self {
            secret,
            token_ttl,
            bind_addr: SocketAddr::new(host, port),
            data_dir: var(DATA_DIR_ENV).map(PathBuf::from),
            reject_inactive,
            tls,
            seed,
        })
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidValue { var, value }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
