// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit record with its APY snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{estimate_accrual, hours_between, Apy, LockPeriod, LockStatus};

/// A deposit made into the vault, mirrored locally.
///
/// `apy_snapshot` is captured once in [`Deposit::new`] and never re-derived
/// from the rate table, so later table edits cannot change the rate of an
/// existing deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Unique deposit identifier.
    pub deposit_id: String,
    /// Depositor address (lowercase, 0x-prefixed).
    pub address: String,
    /// Principal in USDC smallest units (6 decimals).
    pub principal: u64,
    /// Lock duration in months, as chosen at deposit time. Kept raw so a
    /// record stays readable after its row leaves the table.
    #[schema(example = 6.0)]
    pub lock_period: f64,
    /// APY at deposit time, in basis points.
    #[schema(value_type = u32, example = 1050)]
    pub apy_snapshot: Apy,
    /// When the deposit was made.
    pub deposited_at: DateTime<Utc>,
    /// Locally derived lock deadline.
    pub lock_until: DateTime<Utc>,
    /// Vault deposit transaction hash, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Deposit {
    pub fn new(
        address: impl Into<String>,
        principal: u64,
        lock_period: LockPeriod,
        deposited_at: DateTime<Utc>,
        tx_hash: Option<String>,
    ) -> Self {
        Self {
            deposit_id: Uuid::new_v4().to_string(),
            address: address.into().to_lowercase(),
            principal,
            lock_period: lock_period.months(),
            apy_snapshot: lock_period.apy(),
            deposited_at,
            lock_until: deposited_at + lock_period.duration(),
            tx_hash,
        }
    }

    /// Estimated yield since the deposit, at the snapshotted rate.
    pub fn estimated_yield(&self, now: DateTime<Utc>) -> u64 {
        estimate_accrual(
            self.principal,
            self.apy_snapshot,
            hours_between(self.deposited_at, now),
        )
    }

    pub fn lock_status(&self, now: DateTime<Utc>) -> LockStatus {
        let lock_until = u64::try_from(self.lock_until.timestamp()).unwrap_or(0);
        LockStatus::evaluate_at(lock_until, now)
    }
}
