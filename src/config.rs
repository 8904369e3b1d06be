// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into an [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `DATA_DIR` | Directory holding the database file | `./data` |
//! | `NONCE_TTL_SECS` | Challenge validity window | `300` |
//! | `NONCE_SWEEP_INTERVAL_SECS` | Expired-challenge sweep period | `60` |
//! | `MORALIS_API_KEY` | Net-worth oracle API key | Oracle disabled |
//! | `MORALIS_BASE_URL` | Net-worth oracle base URL | `https://deep-index.moralis.io/api/v2.2` |
//! | `ORACLE_TIMEOUT_SECS` | Oracle request timeout (1..=30) | `15` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM pair; HTTPS when both set | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Blank values are treated as unset. Values that fail to parse fall back to
//! the default with a warning.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const NONCE_TTL_ENV: &str = "NONCE_TTL_SECS";
pub const NONCE_SWEEP_INTERVAL_ENV: &str = "NONCE_SWEEP_INTERVAL_SECS";
pub const MORALIS_API_KEY_ENV: &str = "MORALIS_API_KEY";
pub const MORALIS_BASE_URL_ENV: &str = "MORALIS_BASE_URL";
pub const ORACLE_TIMEOUT_ENV: &str = "ORACLE_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_NONCE_TTL_SECS: u64 = 300;
pub const DEFAULT_NONCE_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MORALIS_BASE_URL: &str = "https://deep-index.moralis.io/api/v2.2";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 15;

/// Bounds for the oracle timeout; a stuck upstream must not hang a request.
const ORACLE_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=30;

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "market.redb";

/// Net-worth oracle settings. Present only when an API key is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// PEM certificate and key paths for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub nonce_ttl: Duration,
    pub nonce_sweep_interval: Duration,
    pub oracle: Option<OracleConfig>,
    pub tls: Option<TlsConfig>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = parse_or_default(HOST_ENV, get(HOST_ENV), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port: u16 = parse_or_default(PORT_ENV, get(PORT_ENV), DEFAULT_PORT);

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let nonce_ttl = positive_secs(NONCE_TTL_ENV, get(NONCE_TTL_ENV), DEFAULT_NONCE_TTL_SECS);
        let nonce_sweep_interval = positive_secs(
            NONCE_SWEEP_INTERVAL_ENV,
            get(NONCE_SWEEP_INTERVAL_ENV),
            DEFAULT_NONCE_SWEEP_INTERVAL_SECS,
        );

        let oracle = get(MORALIS_API_KEY_ENV).map(|api_key| {
            let timeout_secs: u64 = parse_or_default(
                ORACLE_TIMEOUT_ENV,
                get(ORACLE_TIMEOUT_ENV),
                DEFAULT_ORACLE_TIMEOUT_SECS,
            );
            let clamped = timeout_secs.clamp(*ORACLE_TIMEOUT_RANGE.start(), *ORACLE_TIMEOUT_RANGE.end());
            if clamped != timeout_secs {
                warn!(
                    requested = timeout_secs,
                    applied = clamped,
                    "{ORACLE_TIMEOUT_ENV} out of range, clamping"
                );
            }
            OracleConfig {
                api_key,
                base_url: get(MORALIS_BASE_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_MORALIS_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(clamped),
            }
        });

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                warn!(
                    "Only one of {TLS_CERT_PATH_ENV}/{TLS_KEY_PATH_ENV} is set; serving plain HTTP"
                );
                None
            }
        };

        Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir,
            nonce_ttl,
            nonce_sweep_interval,
            oracle,
            tls,
        }
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
                default
            }
        },
    }
}

fn positive_secs(name: &str, value: Option<String>, default: u64) -> Duration {
    let secs = parse_or_default(name, value, default);
    if secs == 0 {
        warn!(variable = name, default, "Zero is not allowed, using default");
        return Duration::from_secs(default);
    }
    Duration::from_secs(secs)
}
