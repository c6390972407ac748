// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC verification. Steps run through the provider chain, the outcome is
//! scored and the latest assessment per user is kept.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    error::ApiError,
    models::{KycVerifyRequest, WalletAddress},
    state::AppState,
    storage::{KycRepository, StoredKycRecord},
};

#[utoipa::path(
    post,
    path = "/api/stablepay/kyc/verify",
    request_body = KycVerifyRequest,
    tag = "KYC",
    responses(
        (status = 200, body = StoredKycRecord),
        (status = 400, description = "Invalid or duplicate step input"),
        (status = 502, description = "Provider response could not be used"),
        (status = 503, description = "No provider supports a requested step")
    )
)]
pub async fn verify_kyc(
    State(state): State<AppState>,
    Json(request): Json<KycVerifyRequest>,
) -> Result<Json<StoredKycRecord>, ApiError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::bad_request("userId is required"));
    }
    let address = request
        .address
        .as_deref()
        .map(WalletAddress::parse)
        .transpose()?
        .map(String::from);

    let now = state.clock.now();
    let assessment = state.kyc.assess(request.level, &request.steps, now).await?;

    let record = StoredKycRecord {
        user_id: user_id.to_string(),
        address,
        assessment,
        updated_at: now,
    };
    KycRepository::new(&state.db).save(&record)?;

    info!(
        user_id = %record.user_id,
        confidence = record.assessment.confidence,
        status = ?record.assessment.status,
        "KYC assessment stored"
    );

    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/api/stablepay/kyc/{user_id}",
    params(("user_id" = String, Path, description = "Application user id")),
    tag = "KYC",
    responses(
        (status = 200, body = StoredKycRecord),
        (status = 404, description = "No assessment for this user")
    )
)]
pub async fn get_kyc(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StoredKycRecord>, ApiError> {
    KycRepository::new(&state.db)
        .get(&user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No KYC assessment for user {user_id}")))
}
