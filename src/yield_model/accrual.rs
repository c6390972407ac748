// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local yield accrual estimate.
//!
//! This is a simple-interest approximation used for display only:
//!
//! ```text
//! hourly_rate = apy_percent / 100 / 365 / 24
//! accrued     = floor(principal * hourly_rate * elapsed_hours)
//! ```
//!
//! It does not compound and it is never the authoritative figure; the vault
//! contract owns real yield accounting. Results are floored so an estimate
//! can never overstate a withdrawable balance.

use chrono::{DateTime, Utc};

use super::lock_period::{Apy, BASIS_POINTS_PER_PERCENT};

const HOURS_PER_YEAR: u128 = 365 * 24;
const MILLIS_PER_HOUR: u128 = 3_600_000;
const PERCENT: u128 = 100;

/// Estimate yield accrued on `principal` (smallest unit) after `elapsed_hours`.
///
/// Negative, NaN and infinite durations count as zero elapsed time.
pub fn estimate_accrual(principal: u64, apy: Apy, elapsed_hours: f64) -> u64 {
    if principal == 0 {
        return 0;
    }

    let elapsed_millis = elapsed_millis(elapsed_hours);
    if elapsed_millis == 0 {
        return 0;
    }

    let denominator =
        PERCENT * u128::from(BASIS_POINTS_PER_PERCENT) * HOURS_PER_YEAR * MILLIS_PER_HOUR;
    let accrued = u128::from(principal)
        .checked_mul(u128::from(apy.basis_points()))
        .and_then(|v| v.checked_mul(elapsed_millis))
        .map(|numerator| numerator / denominator)
        .unwrap_or(u128::MAX);

    u64::try_from(accrued).unwrap_or(u64::MAX)
}

/// Fractional hours from `from` to `to`, clamped at zero.
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / MILLIS_PER_HOUR as f64
    }
}

/// Whole hours from `from` to `to`, clamped at zero.
pub fn whole_hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_hours()).unwrap_or(0)
}

fn elapsed_millis(elapsed_hours: f64) -> u128 {
    if !elapsed_hours.is_finite() || elapsed_hours <= 0.0 {
        return 0;
    }
    // float -> int casts saturate
    (elapsed_hours * MILLIS_PER_HOUR as f64).floor() as u128
}
