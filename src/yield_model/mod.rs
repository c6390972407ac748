// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lock-period, APY and yield-accrual model.
//!
//! Every caller (metrics endpoint, lock-period listing, estimate endpoint,
//! background poller) goes through this module. Nothing else holds a copy of
//! the rate table or the accrual formula.

pub mod accrual;
pub mod deposit;
pub mod lock_period;
pub mod lock_status;

pub use accrual::{estimate_accrual, hours_between, whole_hours_between};
pub use deposit::Deposit;
pub use lock_period::{apy_for_lock_period, Apy, LockPeriod};
pub use lock_status::LockStatus;

/// Errors produced by the yield model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum YieldModelError {
    #[error("Invalid lock period: {0} months is not an offered lock duration")]
    InvalidLockPeriod(f64),

    #[error("Invalid APY: {0}")]
    InvalidApy(f64),
}
