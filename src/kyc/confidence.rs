// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Weighted KYC confidence score.
//!
//! Each attempted step contributes its weight to the denominator; successful
//! steps also contribute it to the numerator. Weights need not sum to 100.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confidence below this is rejected regardless of level.
pub const REJECTION_FLOOR: u8 = 40;

/// Independent verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    Digilocker,
    Pan,
    FaceLiveness,
    Bank,
    Upi,
}

impl VerificationStep {
    pub const ALL: [VerificationStep; 5] = [
        VerificationStep::Digilocker,
        VerificationStep::Pan,
        VerificationStep::FaceLiveness,
        VerificationStep::Bank,
        VerificationStep::Upi,
    ];

    /// Points earned when this step succeeds.
    pub const fn weight(self) -> u32 {
        match self {
            VerificationStep::Digilocker => 30,
            VerificationStep::Pan => 25,
            VerificationStep::FaceLiveness => 20,
            VerificationStep::Bank => 15,
            VerificationStep::Upi => 10,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            VerificationStep::Digilocker => "digilocker",
            VerificationStep::Pan => "pan",
            VerificationStep::FaceLiveness => "face_liveness",
            VerificationStep::Bank => "bank",
            VerificationStep::Upi => "upi",
        }
    }
}

/// Requested assurance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    #[default]
    Basic,
    Enhanced,
    Premium,
}

impl VerificationLevel {
    /// Minimum confidence to reach `verified`.
    pub const fn threshold(self) -> u8 {
        match self {
            VerificationLevel::Basic => 60,
            VerificationLevel::Enhanced => 75,
            VerificationLevel::Premium => 90,
        }
    }
}

/// Account KYC status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

/// Result of one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: VerificationStep,
    pub weight: u32,
    pub verified: bool,
    /// Provider that verified the step, if any did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Vendor reference for the verifying call, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Last provider error when every provider failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn passed(
        step: VerificationStep,
        provider: impl Into<String>,
        reference: Option<String>,
    ) -> Self {
        Self {
            step,
            weight: step.weight(),
            verified: true,
            provider: Some(provider.into()),
            reference,
            error: None,
        }
    }

    pub fn failed(step: VerificationStep, error: Option<String>) -> Self {
        Self {
            step,
            weight: step.weight(),
            verified: false,
            provider: None,
            reference: None,
            error,
        }
    }
}

/// Aggregated confidence and the status it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfidenceScore {
    pub confidence: u8,
    pub status: KycStatus,
}

/// `round(100 * earned / attempted)`, half up. No attempts gives `0`.
pub fn confidence(outcomes: &[StepOutcome]) -> u8 {
    let attempted: u64 = outcomes.iter().map(|o| u64::from(o.weight)).sum();
    if attempted == 0 {
        return 0;
    }
    let earned: u64 = outcomes
        .iter()
        .filter(|o| o.verified)
        .map(|o| u64::from(o.weight))
        .sum();

    let rounded = (200 * earned + attempted) / (2 * attempted);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Map a confidence to a status for the requested level.
pub fn status_for(level: VerificationLevel, confidence: u8) -> KycStatus {
    if confidence >= level.threshold() {
        KycStatus::Verified
    } else if confidence < REJECTION_FLOOR {
        KycStatus::Rejected
    } else {
        KycStatus::Pending
    }
}

pub fn aggregate(level: VerificationLevel, outcomes: &[StepOutcome]) -> ConfidenceScore {
    let confidence = confidence(outcomes);
    ConfidenceScore {
        confidence,
        status: status_for(level, confidence),
    }
}
