// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::ApiError, metrics::MetricsResponse, models::WalletAddress, state::AppState};

/// Balance, yield and lock status for one address.
///
/// `source` tells whether figures come from a fresh vault read (`onchain`),
/// an older snapshot (`cached`) or the persisted deposit (`estimated`).
#[utoipa::path(
    get,
    path = "/api/stablepay/metrics/{address}",
    params(("address" = String, Path, description = "Depositor wallet address")),
    tag = "Metrics",
    responses(
        (status = 200, body = MetricsResponse),
        (status = 400, description = "Invalid address"),
        (status = 503, description = "Vault unreadable and no deposit on record")
    )
)]
pub async fn get_metrics(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let address = WalletAddress::parse(&address)?;
    let metrics = state.metrics.metrics_for(address.as_str()).await?;
    Ok(Json(metrics))
}
