// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! StablePay vault contract ABI and calldata builders.
//!
//! The vault (lock periods, share accounting, yield accrual) lives on-chain.
//! The server only reads it and prepares unsigned calls; wallets sign.

use alloy::{primitives::U256, sol, sol_types::SolCall};

use super::client::VaultClientError;
use super::erc20::parse_address;
use super::types::UnsignedTransaction;
use crate::yield_model::LockPeriod;

sol! {
    #[sol(rpc)]
    interface IStablePayVault {
        function getUserDeposit(address user) external view returns (uint256 amount, uint256 lockUntil, uint256 yieldEarned);
        function getYieldAvailable(address user) external view returns (uint256);
        function deposit(uint256 amount, uint256 lockDuration) external;
        function withdraw(uint256 amount) external;
        function claimYield() external;
    }
}

/// Vault call a wallet can be asked to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultCall {
    Deposit { amount: u128, lock_period: LockPeriod },
    Withdraw { amount: u128 },
    ClaimYield,
}

impl VaultCall {
    pub fn encode(self) -> Vec<u8> {
        match self {
            VaultCall::Deposit {
                amount,
                lock_period,
            } => {
                let lock_seconds = u64::try_from(lock_period.duration().num_seconds()).unwrap_or(0);
                IStablePayVault::depositCall {
                    amount: U256::from(amount),
                    lockDuration: U256::from(lock_seconds),
                }
                .abi_encode()
            }
            VaultCall::Withdraw { amount } => IStablePayVault::withdrawCall {
                amount: U256::from(amount),
            }
            .abi_encode(),
            VaultCall::ClaimYield => IStablePayVault::claimYieldCall {}.abi_encode(),
        }
    }
}

/// Wrap a vault call as an unsigned transaction to `vault_address`.
pub fn vault_transaction(
    vault_address: &str,
    call: VaultCall,
    chain_id: u64,
) -> Result<UnsignedTransaction, VaultClientError> {
    let vault = parse_address(vault_address)?;
    Ok(UnsignedTransaction {
        to: vault.to_checksum(None),
        data: format!("0x{}", alloy::hex::encode(call.encode())),
        value: "0".to_string(),
        chain_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAULT: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn deposit_encodes_lock_duration_in_seconds() {
        let lock_period = LockPeriod::from_months(0.5).unwrap();
        let data = VaultCall::Deposit {
            amount: 1_000_000,
            lock_period,
        }
        .encode();

        assert_eq!(&data[..4], IStablePayVault::depositCall::SELECTOR.as_slice());
        assert_eq!(data.len(), 4 + 32 + 32);
        let lock = U256::from_be_slice(&data[36..68]);
        assert_eq!(lock, U256::from(15u64 * 86_400));
    }

    #[test]
    fn claim_has_no_arguments() {
        let data = VaultCall::ClaimYield.encode();
        assert_eq!(data, IStablePayVault::claimYieldCall::SELECTOR.to_vec());
    }

    #[test]
    fn vault_transaction_targets_vault() {
        let tx = vault_transaction(VAULT, VaultCall::Withdraw { amount: 5 }, 8453).unwrap();
        assert_eq!(tx.to.to_lowercase(), VAULT);
        assert_eq!(tx.chain_id, 8453);
        assert!(tx.data.ends_with("05"));
    }
}
