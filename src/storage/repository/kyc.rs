// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC record repository.
//!
//! Only the latest assessment per user is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{DbResult, StablePayDb, KYC_RECORDS};
use crate::kyc::KycAssessment;

/// Latest KYC assessment stored for a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredKycRecord {
    pub user_id: String,
    /// Wallet address linked to the user, if supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub assessment: KycAssessment,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

pub struct KycRepository<'a> {
    db: &'a StablePayDb,
}

impl<'a> KycRepository<'a> {
    pub fn new(db: &'a StablePayDb) -> Self {
        Self { db }
    }

    /// Store a record, replacing any earlier assessment for the same user.
    pub fn save(&self, record: &StoredKycRecord) -> DbResult<()> {
        self.db.put_json(KYC_RECORDS, &record.user_id, record)
    }

    pub fn get(&self, user_id: &str) -> DbResult<Option<StoredKycRecord>> {
        self.db.get_json(KYC_RECORDS, user_id)
    }
}
