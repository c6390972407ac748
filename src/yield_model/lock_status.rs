// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lock status derived from the vault's `lockUntil` timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MILLIS_PER_DAY: i128 = 86_400_000;

/// Locked/unlocked state at a given instant. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    /// `true` while the lock deadline is in the future.
    pub is_locked: bool,
    /// Whole days left, rounded up. Always `0` once unlocked.
    pub days_remaining: u32,
    /// Lock deadline, `null` when there is no lock on record.
    pub unlock_date: Option<DateTime<Utc>>,
}

impl LockStatus {
    /// Evaluate `lock_until_epoch_seconds` against `now_epoch_millis`.
    pub fn evaluate(lock_until_epoch_seconds: u64, now_epoch_millis: i64) -> Self {
        let remaining_millis =
            i128::from(lock_until_epoch_seconds) * 1_000 - i128::from(now_epoch_millis);
        let is_locked = remaining_millis > 0;

        let days_remaining = if is_locked {
            let days = (remaining_millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
            u32::try_from(days).unwrap_or(u32::MAX)
        } else {
            0
        };

        let unlock_date = if lock_until_epoch_seconds == 0 {
            None
        } else {
            i64::try_from(lock_until_epoch_seconds)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
        };

        Self {
            is_locked,
            days_remaining,
            unlock_date,
        }
    }

    pub fn evaluate_at(lock_until_epoch_seconds: u64, now: DateTime<Utc>) -> Self {
        Self::evaluate(lock_until_epoch_seconds, now.timestamp_millis())
    }

    /// Status for an account that has never locked anything.
    pub fn unlocked() -> Self {
        Self::evaluate(0, 0)
    }
}
