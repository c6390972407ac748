// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.

pub mod deposits;
pub mod kyc;
pub mod withdrawals;

pub use deposits::{DepositRepository, DEFAULT_DEPOSIT_LIMIT};
pub use kyc::{KycRepository, StoredKycRecord};
pub use withdrawals::{StoredWithdrawalRequest, WithdrawalRepository, WithdrawalStatus};
