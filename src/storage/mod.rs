// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Two layers:
//!
//! - [`database::StablePayDb`]: embedded redb file under `DATA_DIR` holding
//!   deposits, KYC records and withdrawal requests.
//! - [`snapshot_cache::SnapshotCache`]: in-memory LRU of the last on-chain
//!   vault reads per address. Lost on restart; the database is not.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   stablepay.redb
//! ```

pub mod database;
pub mod repository;
pub mod snapshot_cache;

pub use database::{DbError, DbResult, StablePayDb};
pub use repository::{
    DepositRepository, KycRepository, StoredKycRecord, StoredWithdrawalRequest,
    WithdrawalRepository, WithdrawalStatus, DEFAULT_DEPOSIT_LIMIT,
};
pub use snapshot_cache::{Cached, SnapshotCache};

/// Database file name under the data directory.
pub const DATABASE_FILE: &str = "stablepay.redb";
