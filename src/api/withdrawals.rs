// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Withdrawal requests. Refused while the vault lock is active.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    blockchain::{vault_transaction, VaultCall},
    error::ApiError,
    models::{
        CreateWithdrawalRequest, ListQuery, ListWithdrawalsResponse, WalletAddress,
        WithdrawalResponse,
    },
    state::AppState,
    storage::{StoredWithdrawalRequest, WithdrawalRepository, DEFAULT_DEPOSIT_LIMIT},
};

#[utoipa::path(
    post,
    path = "/api/stablepay/withdrawals",
    request_body = CreateWithdrawalRequest,
    tag = "Withdrawals",
    responses(
        (status = 201, body = WithdrawalResponse),
        (status = 400, description = "Invalid address or amount"),
        (status = 409, description = "`deposit_locked`: the lock period has not ended"),
        (status = 503, description = "Vault unreadable and no deposit on record")
    )
)]
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Json(request): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), ApiError> {
    let address = WalletAddress::parse(&request.address)?;
    if request.amount == 0 {
        return Err(ApiError::bad_request("amount must be greater than zero"));
    }

    let metrics = state.metrics.metrics_for(address.as_str()).await?;
    if metrics.lock_status.is_locked {
        return Err(ApiError::conflict(format!(
            "Deposit is locked for {} more day(s)",
            metrics.lock_status.days_remaining
        ))
        .with_code("deposit_locked"));
    }

    let balance: u128 = metrics
        .user_balance
        .parse()
        .map_err(|_| ApiError::internal("Unreadable vault balance"))?;
    if u128::from(request.amount) > balance {
        return Err(ApiError::bad_request(format!(
            "amount {} exceeds vault balance {balance}",
            request.amount
        ))
        .with_code("insufficient_balance"));
    }

    let transaction = vault_transaction(
        &state.vault.vault_address,
        VaultCall::Withdraw {
            amount: u128::from(request.amount),
        },
        state.vault.network.chain_id,
    )?;

    let record = StoredWithdrawalRequest::new(
        address.as_str(),
        request.amount,
        request.tx_hash,
        state.clock.now(),
    );
    WithdrawalRepository::new(&state.db).create(&record)?;

    info!(
        request_id = %record.request_id,
        address = %record.address,
        amount = record.amount,
        source = ?metrics.source,
        "Withdrawal requested"
    );

    Ok((
        StatusCode::CREATED,
        Json(WithdrawalResponse {
            request: record,
            transaction,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/stablepay/withdrawals/{address}",
    params(
        ("address" = String, Path, description = "Wallet address"),
        ListQuery
    ),
    tag = "Withdrawals",
    responses((status = 200, body = ListWithdrawalsResponse))
)]
pub async fn list_withdrawals(
    Path(address): Path<String>,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListWithdrawalsResponse>, ApiError> {
    let address = WalletAddress::parse(&address)?;
    let withdrawals = WithdrawalRepository::new(&state.db)
        .list_by_address(address.as_str(), query.limit.unwrap_or(DEFAULT_DEPOSIT_LIMIT))?;
    Ok(Json(ListWithdrawalsResponse { withdrawals }))
}
