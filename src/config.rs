// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variables are read once at startup into [`AppConfig`]. A
//! malformed value is a startup error, never a silent default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the redb database | `./data` |
//! | `BASE_NETWORK` | `base` or `base-sepolia` | `base-sepolia` |
//! | `BASE_RPC_URL` | JSON-RPC endpoint | network public RPC |
//! | `VAULT_ADDRESS` | StablePay vault contract | Required |
//! | `USDC_ADDRESS` | USDC token contract | network USDC |
//! | `RPC_MAX_REQUESTS_PER_SECOND` | Outbound RPC ceiling | `45` |
//! | `RPC_BATCH_SIZE` | Calls per poller batch | `10` |
//! | `RPC_BATCH_DELAY_MS` | Pause between batches | `100` |
//! | `CHAIN_POLL_INTERVAL_SECS` | Snapshot freshness and poll period | `30` |
//! | `SNAPSHOT_RETENTION_SECS` | How long a snapshot serves as fallback | `86400` |
//! | `KYC_PRIMARY_PROVIDER` | `cashfree` or `surepass` | `cashfree` |
//! | `CASHFREE_CLIENT_ID` / `CASHFREE_CLIENT_SECRET` | Cashfree credentials | Optional |
//! | `CASHFREE_BASE_URL` | Cashfree verification API | sandbox |
//! | `SUREPASS_API_TOKEN` | SurePass bearer token | Optional |
//! | `SUREPASS_BASE_URL` | SurePass API | sandbox |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::rate_limit::{
    DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, DEFAULT_MAX_REQUESTS_PER_SECOND,
};
use crate::blockchain::{network_by_key, NetworkConfig, BASE_SEPOLIA};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory.
///
/// # Default
/// `./data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const BASE_NETWORK_ENV: &str = "BASE_NETWORK";
pub const BASE_RPC_URL_ENV: &str = "BASE_RPC_URL";
pub const VAULT_ADDRESS_ENV: &str = "VAULT_ADDRESS";
pub const USDC_ADDRESS_ENV: &str = "USDC_ADDRESS";
pub const RPC_MAX_REQUESTS_ENV: &str = "RPC_MAX_REQUESTS_PER_SECOND";
pub const RPC_BATCH_SIZE_ENV: &str = "RPC_BATCH_SIZE";
pub const RPC_BATCH_DELAY_ENV: &str = "RPC_BATCH_DELAY_MS";

/// Snapshot freshness window and poller period, in seconds.
///
/// # Default
/// `30`
pub const CHAIN_POLL_INTERVAL_ENV: &str = "CHAIN_POLL_INTERVAL_SECS";

pub const SNAPSHOT_RETENTION_ENV: &str = "SNAPSHOT_RETENTION_SECS";
pub const KYC_PRIMARY_PROVIDER_ENV: &str = "KYC_PRIMARY_PROVIDER";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_SNAPSHOT_RETENTION_SECS: u64 = 86_400;
const KYC_PROVIDERS: [&str; 2] = ["cashfree", "surepass"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub vault_address: String,
    pub usdc_address: String,
    pub rpc_max_requests_per_second: u32,
    pub rpc_batch_size: usize,
    pub rpc_batch_delay: Duration,
    pub chain_poll_interval: Duration,
    pub snapshot_retention: Duration,
    pub kyc_primary_provider: String,
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid(HOST_ENV, &host, e))?;

        let network = match get(BASE_NETWORK_ENV) {
            Some(key) => network_by_key(&key)
                .ok_or_else(|| invalid(BASE_NETWORK_ENV, &key, "expected base or base-sepolia"))?,
            None => BASE_SEPOLIA,
        };

        let rpc_url = get(BASE_RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string());
        url::Url::parse(&rpc_url).map_err(|e| invalid(BASE_RPC_URL_ENV, &rpc_url, e))?;

        let vault_address = get(VAULT_ADDRESS_ENV).ok_or(ConfigError::Missing(VAULT_ADDRESS_ENV))?;
        check_address(VAULT_ADDRESS_ENV, &vault_address)?;
        let usdc_address = get(USDC_ADDRESS_ENV).unwrap_or_else(|| network.usdc_address.to_string());
        check_address(USDC_ADDRESS_ENV, &usdc_address)?;

        let rpc_max_requests_per_second =
            parse_or(&get, RPC_MAX_REQUESTS_ENV, DEFAULT_MAX_REQUESTS_PER_SECOND)?;
        let rpc_batch_size = parse_or(&get, RPC_BATCH_SIZE_ENV, DEFAULT_BATCH_SIZE)?;
        let batch_delay_ms =
            parse_or(&get, RPC_BATCH_DELAY_ENV, DEFAULT_BATCH_DELAY.as_millis() as u64)?;
        let poll_secs = parse_or(&get, CHAIN_POLL_INTERVAL_ENV, DEFAULT_POLL_INTERVAL_SECS)?;
        let retention_secs =
            parse_or(&get, SNAPSHOT_RETENTION_ENV, DEFAULT_SNAPSHOT_RETENTION_SECS)?;

        for (key, value) in [
            (RPC_MAX_REQUESTS_ENV, u64::from(rpc_max_requests_per_second)),
            (RPC_BATCH_SIZE_ENV, rpc_batch_size as u64),
            (CHAIN_POLL_INTERVAL_ENV, poll_secs),
        ] {
            if value == 0 {
                return Err(invalid(key, "0", "must be greater than zero"));
            }
        }
        if retention_secs < poll_secs {
            return Err(invalid(
                SNAPSHOT_RETENTION_ENV,
                &retention_secs.to_string(),
                format!("must be at least {CHAIN_POLL_INTERVAL_ENV}"),
            ));
        }

        let kyc_primary_provider = get(KYC_PRIMARY_PROVIDER_ENV)
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_else(|| KYC_PROVIDERS[0].to_string());
        if !KYC_PROVIDERS.contains(&kyc_primary_provider.as_str()) {
            return Err(invalid(
                KYC_PRIMARY_PROVIDER_ENV,
                &kyc_primary_provider,
                "expected cashfree or surepass",
            ));
        }

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, other, "expected json or pretty")),
        };

        Ok(Self {
            bind_addr,
            data_dir: PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            network,
            rpc_url,
            vault_address,
            usdc_address,
            rpc_max_requests_per_second,
            rpc_batch_size,
            rpc_batch_delay: Duration::from_millis(batch_delay_ms),
            chain_poll_interval: Duration::from_secs(poll_secs),
            snapshot_retention: Duration::from_secs(retention_secs),
            kyc_primary_provider,
            log_format,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(key, &raw, e)),
        None => Ok(default),
    }
}

fn check_address(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if crate::models::is_evm_address(value) {
        Ok(())
    } else {
        Err(invalid(key, value, "expected 0x followed by 40 hex characters"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const VAULT: &str = "0x2222222222222222222222222222222222222222";

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_vault_set() {
        let config = load(&[(VAULT_ADDRESS_ENV, VAULT)]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.rpc_url, "https://sepolia.base.org");
        assert_eq!(config.usdc_address, BASE_SEPOLIA.usdc_address);
        assert_eq!(config.rpc_max_requests_per_second, 45);
        assert_eq!(config.rpc_batch_size, 10);
        assert_eq!(config.rpc_batch_delay, Duration::from_millis(100));
        assert_eq!(config.chain_poll_interval, Duration::from_secs(30));
        assert_eq!(config.snapshot_retention, Duration::from_secs(86_400));
        assert_eq!(config.kyc_primary_provider, "cashfree");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn vault_address_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing(VAULT_ADDRESS_ENV));
        assert_eq!(
            load(&[(VAULT_ADDRESS_ENV, "   ")]).unwrap_err(),
            ConfigError::Missing(VAULT_ADDRESS_ENV)
        );
    }

    #[test]
    fn mainnet_switches_presets() {
        let config = load(&[(VAULT_ADDRESS_ENV, VAULT), (BASE_NETWORK_ENV, "base")]).unwrap();
        assert_eq!(config.network.chain_id, 8453);
        assert_eq!(config.usdc_address, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
    }

    #[test]
    fn malformed_values_are_errors() {
        let cases = [
            (PORT_ENV, "http"),
            (BASE_NETWORK_ENV, "avalanche"),
            (BASE_RPC_URL_ENV, "not a url"),
            (USDC_ADDRESS_ENV, "0x1234"),
            (RPC_MAX_REQUESTS_ENV, "0"),
            (RPC_BATCH_SIZE_ENV, "-1"),
            (CHAIN_POLL_INTERVAL_ENV, "0"),
            (SNAPSHOT_RETENTION_ENV, "10"),
            (KYC_PRIMARY_PROVIDER_ENV, "onfido"),
            (LOG_FORMAT_ENV, "xml"),
        ];
        for (key, value) in cases {
            let err = load(&[(VAULT_ADDRESS_ENV, VAULT), (key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { key: k, .. } if *k == key),
                "{key}={value}: {err:?}"
            );
        }
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            (VAULT_ADDRESS_ENV, VAULT),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (RPC_BATCH_DELAY_ENV, "250"),
            (KYC_PRIMARY_PROVIDER_ENV, "SurePass"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.rpc_batch_delay, Duration::from_millis(250));
        assert_eq!(config.kyc_primary_provider, "surepass");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
