// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Base RPC client for vault reads.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::erc20::parse_address;
use super::rate_limit::RpcRateLimiter;
use super::types::{NetworkConfig, OnChainDeposit};
use super::vault::IStablePayVault;
use crate::BoxFuture;

/// HTTP provider type for Base (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read access to the vault contract.
///
/// Object safe so handlers and the poller can hold `Arc<dyn VaultReader>`.
pub trait VaultReader: Send + Sync {
    /// `getUserDeposit(address) -> (amount, lockUntil, yieldEarned)`
    fn get_user_deposit<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<OnChainDeposit, VaultClientError>>;

    /// `getYieldAvailable(address) -> amount`
    fn get_yield_available<'a>(&'a self, address: &'a str)
        -> BoxFuture<'a, Result<u128, VaultClientError>>;
}

/// Vault client on Base. Every RPC call goes through the shared rate limiter.
pub struct VaultClient {
    /// Network configuration
    network: NetworkConfig,
    /// Vault contract address
    vault_address: Address,
    /// Alloy HTTP provider
    provider: HttpProvider,
    /// Outbound RPC budget
    limiter: RpcRateLimiter,
}

impl VaultClient {
    /// Create a client for `vault_address` on `network`, using `rpc_url`.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        vault_address: &str,
        limiter: RpcRateLimiter,
    ) -> Result<Self, VaultClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| VaultClientError::InvalidRpcUrl(e.to_string()))?;
        let vault_address = parse_address(vault_address)?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            vault_address,
            provider,
            limiter,
        })
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, VaultClientError> {
        self.limiter
            .execute(self.provider.get_block_number())
            .await
            .map_err(|e| VaultClientError::RpcError(e.to_string()))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn vault_address(&self) -> Address {
        self.vault_address
    }

    fn contract(&self) -> IStablePayVault::IStablePayVaultInstance<HttpProvider> {
        IStablePayVault::new(self.vault_address, self.provider.clone())
    }
}

impl VaultReader for VaultClient {
    fn get_user_deposit<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<OnChainDeposit, VaultClientError>> {
        Box::pin(async move {
            let user = parse_address(address)?;
            let contract = self.contract();

            let position = self
                .limiter
                .execute(async { contract.getUserDeposit(user).call().await })
                .await
                .map_err(|e| VaultClientError::ContractError(e.to_string()))?;

            Ok(OnChainDeposit {
                amount: to_u128(position.amount)?,
                lock_until: u64::try_from(position.lockUntil)
                    .map_err(|_| VaultClientError::Overflow("lockUntil".to_string()))?,
                yield_earned: to_u128(position.yieldEarned)?,
            })
        })
    }

    fn get_yield_available<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<u128, VaultClientError>> {
        Box::pin(async move {
            let user = parse_address(address)?;
            let contract = self.contract();

            let available: U256 = self
                .limiter
                .execute(async { contract.getYieldAvailable(user).call().await })
                .await
                .map_err(|e| VaultClientError::ContractError(e.to_string()))?;

            to_u128(available)
        })
    }
}

fn to_u128(value: U256) -> Result<u128, VaultClientError> {
    u128::try_from(value).map_err(|_| VaultClientError::Overflow(value.to_string()))
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Value out of range: {0}")]
    Overflow(String),
}
