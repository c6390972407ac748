// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded StablePay database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `deposits`: deposit_id → serialized Deposit
//! - `address_deposit_index`: composite key (address|!timestamp|deposit_id) → deposit_id
//! - `kyc_records`: user_id → serialized StoredKycRecord
//! - `withdrawal_requests`: request_id → serialized StoredWithdrawalRequest
//! - `address_withdrawal_index`: composite key (address|!timestamp|request_id) → request_id

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;
type IndexTable = TableDefinition<'static, &'static [u8], &'static str>;

pub(crate) const DEPOSITS: JsonTable = TableDefinition::new("deposits");
pub(crate) const ADDRESS_DEPOSIT_INDEX: IndexTable = TableDefinition::new("address_deposit_index");
pub(crate) const KYC_RECORDS: JsonTable = TableDefinition::new("kyc_records");
pub(crate) const WITHDRAWALS: JsonTable = TableDefinition::new("withdrawal_requests");
pub(crate) const ADDRESS_WITHDRAWAL_INDEX: IndexTable =
    TableDefinition::new("address_withdrawal_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite index key.
///
/// Format: `lowercase_address | inverted_timestamp_be_bytes | id`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_index_key(address: &str, timestamp: i64, id: &str) -> Vec<u8> {
    let addr = address.to_lowercase();
    let mut key = Vec::with_capacity(addr.len() + 1 + 8 + 1 + id.len());
    key.extend_from_slice(addr.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!timestamp as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(id.as_bytes());
    key
}

/// Prefix and exclusive upper bound covering every key of one address.
fn make_prefix_range(address: &str) -> (Vec<u8>, Vec<u8>) {
    let addr = address.to_lowercase();
    let mut start = Vec::with_capacity(addr.len() + 1);
    start.extend_from_slice(addr.as_bytes());
    start.push(b'|');

    let mut end = start.clone();
    // past any valid key with this prefix
    end.extend_from_slice(&[0xFF; 20]);
    (start, end)
}

// =============================================================================
// StablePayDb
// =============================================================================

/// Embedded ACID database for deposits, KYC records and withdrawal requests.
pub struct StablePayDb {
    db: Database,
}

impl StablePayDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DEPOSITS)?;
            let _ = write_txn.open_table(ADDRESS_DEPOSIT_INDEX)?;
            let _ = write_txn.open_table(KYC_RECORDS)?;
            let _ = write_txn.open_table(WITHDRAWALS)?;
            let _ = write_txn.open_table(ADDRESS_WITHDRAWAL_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Confirm the database file is readable.
    pub fn check(&self) -> DbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(DEPOSITS)?;
        Ok(())
    }

    /// Insert or replace a JSON record.
    pub(crate) fn put_json<T: Serialize>(&self, table: JsonTable, id: &str, value: &T) -> DbResult<()> {
        let json = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut records = write_txn.open_table(table)?;
            records.insert(id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Insert a new JSON record and its address index entry atomically.
    /// Fails with `AlreadyExists` if `id` is taken.
    pub(crate) fn insert_indexed<T: Serialize>(
        &self,
        table: JsonTable,
        index: IndexTable,
        id: &str,
        address: &str,
        timestamp: i64,
        value: &T,
    ) -> DbResult<()> {
        let json = serde_json::to_vec(value)?;
        let key = make_index_key(address, timestamp, id);

        let write_txn = self.db.begin_write()?;
        {
            let mut records = write_txn.open_table(table)?;
            if records.get(id)?.is_some() {
                return Err(DbError::AlreadyExists(id.to_string()));
            }
            records.insert(id, json.as_slice())?;

            let mut idx = write_txn.open_table(index)?;
            idx.insert(key.as_slice(), id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a JSON record by id.
    pub(crate) fn get_json<T: DeserializeOwned>(&self, table: JsonTable, id: &str) -> DbResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let records = read_txn.open_table(table)?;
        match records.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Newest-first records for an address, at most `limit`.
    pub(crate) fn list_by_address<T: DeserializeOwned>(
        &self,
        table: JsonTable,
        index: IndexTable,
        address: &str,
        limit: usize,
    ) -> DbResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let idx = read_txn.open_table(index)?;
        let records = read_txn.open_table(table)?;

        let (start, end) = make_prefix_range(address);
        let mut results = Vec::new();

        for entry in idx.range(start.as_slice()..end.as_slice())? {
            if results.len() >= limit {
                break;
            }
            let entry = entry?;
            let id = entry.1.value().to_string();
            if let Some(value) = records.get(id.as_str())? {
                results.push(serde_json::from_slice(value.value())?);
            }
        }

        Ok(results)
    }
}

// =============================================================================
// Tests
// =============================================================================
