// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Withdrawal request repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{DbResult, StablePayDb, ADDRESS_WITHDRAWAL_INDEX, WITHDRAWALS};

/// Withdrawal request status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    /// Calldata prepared, waiting for the user to sign
    Requested,
    /// User reported the broadcast transaction hash
    Submitted,
}

/// Withdrawal request record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredWithdrawalRequest {
    pub request_id: String,
    /// Lowercase wallet address
    pub address: String,
    /// Raw USDC amount (6 decimals)
    pub amount: u64,
    pub status: WithdrawalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl StoredWithdrawalRequest {
    pub fn new(address: &str, amount: u64, tx_hash: Option<String>, created_at: DateTime<Utc>) -> Self {
        let status = if tx_hash.is_some() {
            WithdrawalStatus::Submitted
        } else {
            WithdrawalStatus::Requested
        };
        Self {
            request_id: Uuid::new_v4().to_string(),
            address: address.to_lowercase(),
            amount,
            status,
            tx_hash,
            created_at,
        }
    }
}

pub struct WithdrawalRepository<'a> {
    db: &'a StablePayDb,
}

impl<'a> WithdrawalRepository<'a> {
    pub fn new(db: &'a StablePayDb) -> Self {
        Self { db }
    }

    pub fn create(&self, request: &StoredWithdrawalRequest) -> DbResult<()> {
        self.db.insert_indexed(
            WITHDRAWALS,
            ADDRESS_WITHDRAWAL_INDEX,
            &request.request_id,
            &request.address,
            request.created_at.timestamp_millis(),
            request,
        )
    }

    /// Requests for an address, newest first.
    pub fn list_by_address(&self, address: &str, limit: usize) -> DbResult<Vec<StoredWithdrawalRequest>> {
        self.db
            .list_by_address(WITHDRAWALS, ADDRESS_WITHDRAWAL_INDEX, address, limit)
    }
}
