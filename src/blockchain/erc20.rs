// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 (USDC) calls needed before a vault deposit.

use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    sol,
    sol_types::SolCall,
};

use super::client::VaultClientError;
use super::types::UnsignedTransaction;

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Build `USDC.approve(vault, amount)` for the user's wallet.
pub fn approve_transaction(
    token_address: &str,
    spender: &str,
    amount: u128,
    chain_id: u64,
) -> Result<UnsignedTransaction, VaultClientError> {
    let token = parse_address(token_address)?;
    let spender = parse_address(spender)?;

    let data = IERC20::approveCall {
        spender,
        amount: U256::from(amount),
    }
    .abi_encode();

    Ok(UnsignedTransaction {
        to: token.to_checksum(None),
        data: format!("0x{}", alloy::hex::encode(data)),
        value: "0".to_string(),
        chain_id,
    })
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, VaultClientError> {
    Address::from_str(raw).map_err(|e| VaultClientError::InvalidAddress(e.to_string()))
}
