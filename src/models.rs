// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation. Field names are
//! camelCase on the wire.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters), always stored lowercase.
//!
//! ## Model Categories
//!
//! - **Lock periods**: the APY table and single lookups
//! - **Yield**: stateless accrual estimates
//! - **Deposits / Withdrawals**: persisted records and prepared vault calls
//! - **KYC**: verification requests

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::blockchain::UnsignedTransaction;
use crate::error::ApiError;
use crate::kyc::{StepInput, VerificationLevel};
use crate::storage::StoredWithdrawalRequest;
use crate::yield_model::{Deposit, LockPeriod, LockStatus};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// `0x` followed by 40 hex characters, any case.
pub fn is_evm_address(raw: &str) -> bool {
    raw.len() == 42
        && (raw.starts_with("0x") || raw.starts_with("0X"))
        && raw[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Ethereum-compatible wallet address, normalized to lowercase.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let trimmed = raw.trim();
        if is_evm_address(trimmed) {
            Ok(Self(format!("0x{}", trimmed[2..].to_ascii_lowercase())))
        } else {
            Err(ApiError::bad_request(format!(
                "Invalid address `{trimmed}`: expected 0x followed by 40 hex characters"
            ))
            .with_code("invalid_address"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Lock Period Models
// =============================================================================

/// One row of the lock-period table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LockPeriodOption {
    /// Lock duration in months (`0.5` = 15 days).
    pub months: f64,
    /// APY in percent.
    pub apy: f64,
    pub apy_basis_points: u32,
    /// Lock length in days.
    pub lock_days: i64,
}

impl From<LockPeriod> for LockPeriodOption {
    fn from(period: LockPeriod) -> Self {
        Self {
            months: period.months(),
            apy: period.apy().as_percent(),
            apy_basis_points: period.apy().basis_points(),
            lock_days: period.duration().num_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockPeriodsResponse {
    pub lock_periods: Vec<LockPeriodOption>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ApyQuery {
    /// Lock duration in months.
    pub months: f64,
}

// =============================================================================
// Yield Models
// =============================================================================

/// Stateless accrual estimate. Give either `lockPeriodMonths` or `apy`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YieldEstimateRequest {
    /// Principal in USDC smallest units.
    pub principal: u64,
    #[serde(default)]
    pub lock_period_months: Option<f64>,
    /// APY in percent.
    #[serde(default)]
    pub apy: Option<f64>,
    /// Negative values are treated as zero.
    pub elapsed_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YieldEstimateResponse {
    pub principal: String,
    pub apy: f64,
    pub elapsed_hours: f64,
    /// Floored, in USDC smallest units. Not authoritative.
    pub estimated_yield: String,
    pub estimated_yield_formatted: String,
}

// =============================================================================
// Deposit Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositRequest {
    pub address: String,
    /// Principal in USDC smallest units.
    pub principal: u64,
    pub lock_period_months: f64,
    /// Vault deposit transaction hash, if already broadcast.
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Deposit with values derived at read time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositView {
    #[serde(flatten)]
    pub deposit: Deposit,
    pub lock_status: LockStatus,
    /// Local estimate since the deposit, at the snapshotted APY.
    pub estimated_yield: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDepositsResponse {
    pub deposits: Vec<DepositView>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Max records to return (default 50).
    pub limit: Option<usize>,
}

// =============================================================================
// Vault Call Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareDepositRequest {
    pub address: String,
    /// Amount in USDC smallest units.
    pub amount: u64,
    pub lock_period_months: f64,
}

/// Calls for the user's wallet to sign, in order: `approve` then `deposit`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepareDepositResponse {
    pub approve: UnsignedTransaction,
    pub deposit: UnsignedTransaction,
    pub lock_period_months: f64,
    /// APY that applies if the deposit is recorded now.
    pub apy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrepareClaimRequest {
    pub address: String,
}

// =============================================================================
// Withdrawal Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalRequest {
    pub address: String,
    /// Amount in USDC smallest units.
    pub amount: u64,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    pub request: StoredWithdrawalRequest,
    /// `withdraw(amount)` for the user's wallet to sign.
    pub transaction: UnsignedTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListWithdrawalsResponse {
    pub withdrawals: Vec<StoredWithdrawalRequest>,
}

// =============================================================================
// KYC Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycVerifyRequest {
    pub user_id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub level: VerificationLevel,
    pub steps: Vec<StepInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_is_validated_and_lowercased() {
        let addr = WalletAddress::parse(" 0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12 ").unwrap();
        assert_eq!(addr.as_str(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");

        let to_string: String = addr.into();
        assert_eq!(to_string.len(), 42);

        for bad in ["", "0x1234", "742d35Cc6634C0532925a3b844Bc9e7595f4aB1200", "0xZZ2d35Cc6634C0532925a3b844Bc9e7595f4aB12"] {
            let err = WalletAddress::parse(bad).unwrap_err();
            assert_eq!(err.code, Some("invalid_address"));
        }
    }

    #[test]
    fn lock_period_option_from_table_row() {
        let option = LockPeriodOption::from(LockPeriod::from_months(0.5).unwrap());
        assert_eq!(option.months, 0.5);
        assert_eq!(option.apy, 7.0);
        assert_eq!(option.apy_basis_points, 700);
        assert_eq!(option.lock_days, 15);
    }

    #[test]
    fn kyc_request_defaults_to_basic_level() {
        let request: KycVerifyRequest = serde_json::from_str(
            r#"{"userId":"u1","steps":[{"step":"upi","vpa":"alice@okbank"}]}"#,
        )
        .unwrap();
        assert_eq!(request.level, VerificationLevel::Basic);
        assert_eq!(request.steps.len(), 1);
    }
}
