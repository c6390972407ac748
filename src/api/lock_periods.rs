// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lock-period table and stateless yield estimates.

use axum::{extract::Query, Json};

use crate::{
    blockchain::{format_amount, USDC_DECIMALS},
    error::ApiError,
    models::{ApyQuery, LockPeriodOption, LockPeriodsResponse, YieldEstimateRequest, YieldEstimateResponse},
    yield_model::{estimate_accrual, Apy, LockPeriod},
};

#[utoipa::path(
    get,
    path = "/api/stablepay/lock-periods",
    tag = "Yield",
    responses((status = 200, body = LockPeriodsResponse))
)]
pub async fn list_lock_periods() -> Json<LockPeriodsResponse> {
    Json(LockPeriodsResponse {
        lock_periods: LockPeriod::all().map(LockPeriodOption::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/stablepay/apy",
    params(ApyQuery),
    tag = "Yield",
    responses(
        (status = 200, body = LockPeriodOption),
        (status = 400, description = "`invalid_lock_period`: months is not in the table")
    )
)]
pub async fn get_apy(Query(query): Query<ApyQuery>) -> Result<Json<LockPeriodOption>, ApiError> {
    let period = LockPeriod::from_months(query.months)?;
    Ok(Json(period.into()))
}

/// Simple-interest estimate. Display only; the vault is authoritative.
#[utoipa::path(
    post,
    path = "/api/stablepay/yield/estimate",
    request_body = YieldEstimateRequest,
    tag = "Yield",
    responses(
        (status = 200, body = YieldEstimateResponse),
        (status = 400, description = "Unknown lock period or invalid APY"),
        (status = 422, description = "Both or neither of lockPeriodMonths and apy given")
    )
)]
pub async fn estimate_yield(
    Json(request): Json<YieldEstimateRequest>,
) -> Result<Json<YieldEstimateResponse>, ApiError> {
    let apy = match (request.lock_period_months, request.apy) {
        (Some(months), None) => LockPeriod::from_months(months)?.apy(),
        (None, Some(percent)) => Apy::from_percent(percent)?,
        _ => {
            return Err(ApiError::unprocessable(
                "Provide exactly one of lockPeriodMonths or apy",
            ))
        }
    };

    let estimated = estimate_accrual(request.principal, apy, request.elapsed_hours);

    Ok(Json(YieldEstimateResponse {
        principal: request.principal.to_string(),
        apy: apy.as_percent(),
        elapsed_hours: request.elapsed_hours.max(0.0),
        estimated_yield: estimated.to_string(),
        estimated_yield_formatted: format_amount(u128::from(estimated), USDC_DECIMALS),
    }))
}
