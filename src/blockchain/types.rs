// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Base network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Short key used in configuration (`base`, `base-sepolia`)
    pub key: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default public RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Circle USDC contract on this network
    pub usdc_address: &'static str,
}

/// Base Mainnet configuration.
pub const BASE_MAINNET: NetworkConfig = NetworkConfig {
    name: "Base",
    key: "base",
    chain_id: 8453,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    usdc_address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
};

/// Base Sepolia Testnet configuration.
pub const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Base Sepolia",
    key: "base-sepolia",
    chain_id: 84532,
    rpc_url: "https://sepolia.base.org",
    explorer_url: "https://sepolia.basescan.org",
    usdc_address: "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
};

/// USDC uses 6 decimals on every network we support.
pub const USDC_DECIMALS: u8 = 6;

/// Resolve a configured network key.
pub fn network_by_key(raw: &str) -> Option<NetworkConfig> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "base" | "base-mainnet" | "mainnet" => Some(BASE_MAINNET),
        "base-sepolia" | "sepolia" => Some(BASE_SEPOLIA),
        _ => None,
    }
}

/// Vault position as reported by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainDeposit {
    /// Deposited principal (USDC smallest units)
    pub amount: u128,
    /// Lock deadline, unix seconds (`0` = no lock)
    pub lock_until: u64,
    /// Yield credited by the contract so far
    pub yield_earned: u128,
}

/// Unsigned transaction for the user's wallet to sign and submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// Target contract
    pub to: String,
    /// ABI-encoded calldata (0x-prefixed hex)
    pub data: String,
    /// Native value in wei (always "0" for vault calls)
    pub value: String,
    /// Chain the transaction must be sent on
    pub chain_id: u64,
}

/// Format a raw token amount with the specified decimals (max 6 shown).
pub fn format_amount(raw: u128, decimals: u8) -> String {
    if raw == 0 {
        return "0".to_string();
    }

    let divisor = 10u128.pow(u32::from(decimals));
    let whole = raw / divisor;
    let remainder = raw % divisor;

    if remainder == 0 {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, &trimmed[..trimmed.len().min(6)])
        }
    }
}
