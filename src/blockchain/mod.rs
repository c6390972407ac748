// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Base.
//!
//! This module provides functionality for:
//! - Reading vault positions (`getUserDeposit`, `getYieldAvailable`)
//! - Rate limiting outbound RPC calls
//! - Preparing unsigned approve/deposit/withdraw/claim calls

pub mod client;
pub mod erc20;
pub mod rate_limit;
pub mod types;
pub mod vault;

pub use client::{VaultClient, VaultClientError, VaultReader};
pub use rate_limit::RpcRateLimiter;
pub use types::*;
pub use vault::{vault_transaction, VaultCall};
