// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit records. The APY is snapshotted when the record is created.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::ApiError,
    models::{CreateDepositRequest, DepositView, ListDepositsResponse, ListQuery, WalletAddress},
    state::AppState,
    storage::{DepositRepository, DEFAULT_DEPOSIT_LIMIT},
    yield_model::{Deposit, LockPeriod},
};

fn view(deposit: Deposit, now: chrono::DateTime<chrono::Utc>) -> DepositView {
    DepositView {
        lock_status: deposit.lock_status(now),
        estimated_yield: deposit.estimated_yield(now).to_string(),
        deposit,
    }
}

#[utoipa::path(
    post,
    path = "/api/stablepay/deposits",
    request_body = CreateDepositRequest,
    tag = "Deposits",
    responses(
        (status = 201, body = DepositView),
        (status = 400, description = "Invalid address, amount or lock period")
    )
)]
pub async fn create_deposit(
    State(state): State<AppState>,
    Json(request): Json<CreateDepositRequest>,
) -> Result<(StatusCode, Json<DepositView>), ApiError> {
    let address = WalletAddress::parse(&request.address)?;
    if request.principal == 0 {
        return Err(ApiError::bad_request("principal must be greater than zero"));
    }
    let lock_period = LockPeriod::from_months(request.lock_period_months)?;

    let now = state.clock.now();
    let deposit = Deposit::new(address.as_str(), request.principal, lock_period, now, request.tx_hash);
    DepositRepository::new(&state.db).create(&deposit)?;

    info!(
        deposit_id = %deposit.deposit_id,
        address = %deposit.address,
        principal = deposit.principal,
        lock_months = lock_period.months(),
        apy_bps = deposit.apy_snapshot.basis_points(),
        "Deposit recorded"
    );

    Ok((StatusCode::CREATED, Json(view(deposit, now))))
}

#[utoipa::path(
    get,
    path = "/api/stablepay/deposits/{address}",
    params(
        ("address" = String, Path, description = "Depositor wallet address"),
        ListQuery
    ),
    tag = "Deposits",
    responses((status = 200, body = ListDepositsResponse))
)]
pub async fn list_deposits(
    Path(address): Path<String>,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListDepositsResponse>, ApiError> {
    let address = WalletAddress::parse(&address)?;
    let limit = query.limit.unwrap_or(DEFAULT_DEPOSIT_LIMIT);
    let now = state.clock.now();

    let deposits = DepositRepository::new(&state.db)
        .list_by_address(address.as_str(), limit)?
        .into_iter()
        .map(|d| view(d, now))
        .collect();

    Ok(Json(ListDepositsResponse { deposits }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{TestApp, USER};
    use chrono::Duration;

    fn request(months: f64) -> CreateDepositRequest {
        CreateDepositRequest {
            address: USER.to_uppercase().replace("0X", "0x"),
            principal: 50_000_000_000,
            lock_period_months: months,
            tx_hash: None,
        }
    }

    #[tokio::test]
    async fn create_snapshots_apy_and_lowercases_address() {
        let app = TestApp::new();
        let (status, Json(view)) = create_deposit(State(app.state.clone()), Json(request(11.0)))
            .await
            .expect("deposit is recorded");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.deposit.address, USER);
        assert_eq!(view.deposit.apy_snapshot.basis_points(), 1300);
        assert!(view.lock_status.is_locked);
        assert_eq!(view.estimated_yield, "0");
    }

    #[tokio::test]
    async fn unknown_lock_period_is_rejected() {
        let app = TestApp::new();
        let err = create_deposit(State(app.state.clone()), Json(request(13.0)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, Some("invalid_lock_period"));
    }

    #[tokio::test]
    async fn zero_principal_is_rejected() {
        let app = TestApp::new();
        let mut req = request(1.0);
        req.principal = 0;
        let err = create_deposit(State(app.state.clone()), Json(req)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_shows_accrual_at_read_time() {
        let app = TestApp::new();
        create_deposit(State(app.state.clone()), Json(request(11.0)))
            .await
            .unwrap();
        app.clock.advance(Duration::hours(24));

        let Json(body) = list_deposits(
            Path(USER.to_string()),
            Query(ListQuery { limit: None }),
            State(app.state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(body.deposits.len(), 1);
        assert_eq!(body.deposits[0].estimated_yield, "17808219");
    }

    #[tokio::test]
    async fn list_rejects_bad_address() {
        let app = TestApp::new();
        let err = list_deposits(
            Path("0x123".to_string()),
            Query(ListQuery { limit: None }),
            State(app.state.clone()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, Some("invalid_address"));
    }
}
