// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::NetworkConfig;
use crate::clock::Clock;
use crate::kyc::KycService;
use crate::metrics::MetricsService;
use crate::storage::StablePayDb;

/// Vault contract coordinates used when preparing calldata.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub network: NetworkConfig,
    pub vault_address: String,
    pub usdc_address: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<StablePayDb>,
    pub metrics: Arc<MetricsService>,
    pub kyc: Arc<KycService>,
    pub vault: Arc<VaultSettings>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        db: Arc<StablePayDb>,
        metrics: Arc<MetricsService>,
        kyc: KycService,
        vault: VaultSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            metrics,
            kyc: Arc::new(kyc),
            vault: Arc::new(vault),
            clock,
        }
    }
}
