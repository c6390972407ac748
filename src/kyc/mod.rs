// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC verification: vendor clients, fallback chain and confidence scoring.

pub mod cashfree;
pub mod confidence;
pub mod provider;
pub mod service;
pub mod surepass;

use std::sync::Arc;

use tracing::{info, warn};

pub use cashfree::CashfreeClient;
pub use confidence::{
    aggregate, ConfidenceScore, KycStatus, StepOutcome, VerificationLevel, VerificationStep,
};
pub use provider::{KycError, KycProvider, ProviderVerdict, StepInput};
pub use service::{KycAssessment, KycService};
pub use surepass::SurePassClient;

/// Build the provider chain from the environment.
///
/// Unconfigured vendors are skipped. `primary` names the vendor tried first;
/// the other follows as fallback.
pub fn providers_from_env(primary: &str) -> Vec<Arc<dyn KycProvider>> {
    let mut providers: Vec<Arc<dyn KycProvider>> = Vec::new();

    if CashfreeClient::is_configured() {
        match CashfreeClient::from_env() {
            Ok(client) => providers.push(Arc::new(client)),
            Err(e) => warn!(error = %e, "Cashfree client unavailable"),
        }
    }
    if SurePassClient::is_configured() {
        match SurePassClient::from_env() {
            Ok(client) => providers.push(Arc::new(client)),
            Err(e) => warn!(error = %e, "SurePass client unavailable"),
        }
    }

    order_providers(&mut providers, primary);

    if providers.is_empty() {
        warn!("No KYC providers configured; verification requests will fail");
    } else {
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        info!(providers = ?names, "KYC providers configured");
    }
    providers
}

/// Move the provider called `primary` to the front, keeping the rest in order.
fn order_providers(providers: &mut [Arc<dyn KycProvider>], primary: &str) {
    if let Some(pos) = providers.iter().position(|p| p.name() == primary) {
        providers[..=pos].rotate_right(1);
    }
}
