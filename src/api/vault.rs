// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unsigned vault calls for the user's wallet. The server never signs.

use axum::{extract::State, Json};

use crate::{
    blockchain::{erc20::approve_transaction, vault_transaction, UnsignedTransaction, VaultCall},
    error::ApiError,
    models::{PrepareClaimRequest, PrepareDepositRequest, PrepareDepositResponse, WalletAddress},
    state::AppState,
    yield_model::LockPeriod,
};

#[utoipa::path(
    post,
    path = "/api/stablepay/vault/prepare-deposit",
    request_body = PrepareDepositRequest,
    tag = "Vault",
    responses(
        (status = 200, body = PrepareDepositResponse),
        (status = 400, description = "Invalid address, amount or lock period")
    )
)]
pub async fn prepare_deposit(
    State(state): State<AppState>,
    Json(request): Json<PrepareDepositRequest>,
) -> Result<Json<PrepareDepositResponse>, ApiError> {
    WalletAddress::parse(&request.address)?;
    if request.amount == 0 {
        return Err(ApiError::bad_request("amount must be greater than zero"));
    }
    let lock_period = LockPeriod::from_months(request.lock_period_months)?;

    let vault = &state.vault;
    let amount = u128::from(request.amount);
    let approve = approve_transaction(
        &vault.usdc_address,
        &vault.vault_address,
        amount,
        vault.network.chain_id,
    )?;
    let deposit = vault_transaction(
        &vault.vault_address,
        VaultCall::Deposit {
            amount,
            lock_period,
        },
        vault.network.chain_id,
    )?;

    Ok(Json(PrepareDepositResponse {
        approve,
        deposit,
        lock_period_months: lock_period.months(),
        apy: lock_period.apy().as_percent(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/stablepay/vault/prepare-claim",
    request_body = PrepareClaimRequest,
    tag = "Vault",
    responses(
        (status = 200, body = UnsignedTransaction),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn prepare_claim(
    State(state): State<AppState>,
    Json(request): Json<PrepareClaimRequest>,
) -> Result<Json<UnsignedTransaction>, ApiError> {
    WalletAddress::parse(&request.address)?;
    let tx = vault_transaction(
        &state.vault.vault_address,
        VaultCall::ClaimYield,
        state.vault.network.chain_id,
    )?;
    Ok(Json(tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{TestApp, USER};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn prepare_deposit_returns_approve_then_deposit() {
        let app = TestApp::new();
        let Json(body) = prepare_deposit(
            State(app.state.clone()),
            Json(PrepareDepositRequest {
                address: USER.to_string(),
                amount: 1_000_000,
                lock_period_months: 0.5,
            }),
        )
        .await
        .unwrap();

        // approve(address,uint256) and deposit(uint256,uint256)
        assert!(body.approve.data.starts_with("0x095ea7b3"));
        assert_eq!(body.approve.to.to_lowercase(), app.state.vault.usdc_address.to_lowercase());
        assert_eq!(body.deposit.to.to_lowercase(), app.state.vault.vault_address.to_lowercase());
        assert_eq!(body.deposit.chain_id, 84532);
        assert_eq!(body.apy, 7.0);
    }

    #[tokio::test]
    async fn prepare_deposit_rejects_unknown_lock_period() {
        let app = TestApp::new();
        let err = prepare_deposit(
            State(app.state.clone()),
            Json(PrepareDepositRequest {
                address: USER.to_string(),
                amount: 1,
                lock_period_months: 1.5,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, Some("invalid_lock_period"));
    }

    #[tokio::test]
    async fn prepare_claim_targets_vault() {
        let app = TestApp::new();
        let Json(tx) = prepare_claim(
            State(app.state.clone()),
            Json(PrepareClaimRequest {
                address: USER.to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(tx.value, "0");
        assert_eq!(tx.data.len(), 2 + 8);
    }
}
