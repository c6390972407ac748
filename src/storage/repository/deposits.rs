// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit repository.
//!
//! Deposits are stored together with their APY snapshot; reads never consult
//! the live rate table.

use super::super::database::{DbResult, StablePayDb, ADDRESS_DEPOSIT_INDEX, DEPOSITS};
use crate::yield_model::Deposit;

/// Default page size for deposit listings.
pub const DEFAULT_DEPOSIT_LIMIT: usize = 50;

/// Repository for deposit records.
pub struct DepositRepository<'a> {
    db: &'a StablePayDb,
}

impl<'a> DepositRepository<'a> {
    pub fn new(db: &'a StablePayDb) -> Self {
        Self { db }
    }

    /// Persist a new deposit.
    pub fn create(&self, deposit: &Deposit) -> DbResult<()> {
        self.db.insert_indexed(
            DEPOSITS,
            ADDRESS_DEPOSIT_INDEX,
            &deposit.deposit_id,
            &deposit.address,
            deposit.deposited_at.timestamp_millis(),
            deposit,
        )
    }

    pub fn get(&self, deposit_id: &str) -> DbResult<Option<Deposit>> {
        self.db.get_json(DEPOSITS, deposit_id)
    }

    /// Deposits for an address, newest first.
    pub fn list_by_address(&self, address: &str, limit: usize) -> DbResult<Vec<Deposit>> {
        self.db
            .list_by_address(DEPOSITS, ADDRESS_DEPOSIT_INDEX, address, limit)
    }

    /// Every deposit for an address, newest first.
    pub fn all_for_address(&self, address: &str) -> DbResult<Vec<Deposit>> {
        self.list_by_address(address, usize::MAX)
    }

    /// Most recent deposit for an address.
    pub fn latest_for_address(&self, address: &str) -> DbResult<Option<Deposit>> {
        Ok(self.list_by_address(address, 1)?.into_iter().next())
    }
}
