// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Multi-provider KYC orchestration.
//!
//! Each step is tried against the configured providers in order. The first
//! provider that verifies the step wins; a negative verdict or a vendor error
//! falls through to the next provider.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::confidence::{aggregate, KycStatus, StepOutcome, VerificationLevel};
use super::provider::{KycError, KycProvider, StepInput};

/// Outcome of a KYC verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycAssessment {
    pub level: VerificationLevel,
    pub confidence: u8,
    pub status: KycStatus,
    pub steps: Vec<StepOutcome>,
    #[schema(value_type = String, format = DateTime)]
    pub assessed_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct KycService {
    providers: Vec<Arc<dyn KycProvider>>,
}

impl KycService {
    /// Providers are consulted in the given order.
    pub fn new(providers: Vec<Arc<dyn KycProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run one step through the provider chain.
    ///
    /// Returns `Unsupported` when no provider handles the step. Every other
    /// failure is folded into a failed outcome carrying the last vendor error.
    pub async fn verify_step(&self, input: &StepInput) -> Result<StepOutcome, KycError> {
        let step = input.step();
        let mut last_error: Option<String> = None;
        let mut attempted = false;

        for provider in self.providers.iter().filter(|p| p.supports(step)) {
            attempted = true;
            match provider.verify(input).await {
                Ok(verdict) if verdict.verified => {
                    info!(step = step.as_str(), provider = provider.name(), "KYC step verified");
                    return Ok(StepOutcome::passed(step, provider.name(), verdict.reference));
                }
                Ok(_) => {
                    info!(step = step.as_str(), provider = provider.name(), "KYC step not verified, trying next");
                }
                Err(e) => {
                    warn!(
                        step = step.as_str(),
                        provider = provider.name(),
                        error = %e,
                        "KYC provider failed, trying next"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        if !attempted {
            return Err(KycError::Unsupported(step.as_str()));
        }
        Ok(StepOutcome::failed(step, last_error))
    }

    /// Verify every input and aggregate the outcomes for `level`.
    pub async fn assess(
        &self,
        level: VerificationLevel,
        inputs: &[StepInput],
        now: DateTime<Utc>,
    ) -> Result<KycAssessment, KycError> {
        let mut seen = HashSet::new();
        for input in inputs {
            if !seen.insert(input.step()) {
                return Err(KycError::InvalidInput(format!(
                    "step `{}` listed more than once",
                    input.step().as_str()
                )));
            }
            input.validate()?;
        }

        let mut steps = Vec::with_capacity(inputs.len());
        for input in inputs {
            steps.push(self.verify_step(input).await?);
        }

        let score = aggregate(level, &steps);
        info!(
            level = ?level,
            confidence = score.confidence,
            status = ?score.status,
            steps = steps.len(),
            "KYC assessment complete"
        );

        Ok(KycAssessment {
            level,
            confidence: score.confidence,
            status: score.status,
            steps,
            assessed_at: now,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::kyc::confidence::VerificationStep;
    use crate::kyc::provider::ProviderVerdict;
    use crate::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) enum Behavior {
        Verify,
        Reject,
        Fail,
    }

    pub(crate) struct FakeProvider {
        name: &'static str,
        behavior: Behavior,
        skip: Option<VerificationStep>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        pub(crate) fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                skip: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn without(name: &'static str, behavior: Behavior, skip: VerificationStep) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                skip: Some(skip),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl KycProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supports(&self, step: VerificationStep) -> bool {
            self.skip != Some(step)
        }

        fn verify<'a>(&'a self, _input: &'a StepInput) -> BoxFuture<'a, Result<ProviderVerdict, KycError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match self.behavior {
                    Behavior::Verify => Ok(ProviderVerdict {
                        verified: true,
                        reference: Some("ref".into()),
                    }),
                    Behavior::Reject => Ok(ProviderVerdict {
                        verified: false,
                        reference: None,
                    }),
                    Behavior::Fail => Err(KycError::Request(format!("{} down", self.name))),
                }
            })
        }
    }

    pub(crate) fn service(providers: &[Arc<FakeProvider>]) -> KycService {
        KycService::new(
            providers
                .iter()
                .map(|p| p.clone() as Arc<dyn KycProvider>)
                .collect(),
        )
    }

    fn pan() -> StepInput {
        StepInput::Pan {
            pan: "ABCDE1234F".into(),
            name: None,
        }
    }

    fn digilocker() -> StepInput {
        StepInput::Digilocker {
            verification_id: "dl-42".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = FakeProvider::new("cashfree", Behavior::Verify);
        let fallback = FakeProvider::new("surepass", Behavior::Verify);
        let service = service(&[primary.clone(), fallback.clone()]);

        let outcome = service.verify_step(&pan()).await.unwrap();
        assert!(outcome.verified);
        assert_eq!(outcome.provider.as_deref(), Some("cashfree"));
        assert_eq!(outcome.reference.as_deref(), Some("ref"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let primary = FakeProvider::new("cashfree", Behavior::Fail);
        let fallback = FakeProvider::new("surepass", Behavior::Verify);
        let service = service(&[primary.clone(), fallback]);

        let outcome = service.verify_step(&pan()).await.unwrap();
        assert!(outcome.verified);
        assert_eq!(outcome.provider.as_deref(), Some("surepass"));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn negative_verdict_falls_through() {
        let primary = FakeProvider::new("cashfree", Behavior::Reject);
        let fallback = FakeProvider::new("surepass", Behavior::Verify);
        let service = service(&[primary, fallback.clone()]);

        let outcome = service.verify_step(&pan()).await.unwrap();
        assert!(outcome.verified);
        assert_eq!(outcome.provider.as_deref(), Some("surepass"));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_provider_rejecting_fails_without_error() {
        let service = service(&[
            FakeProvider::new("cashfree", Behavior::Reject),
            FakeProvider::new("surepass", Behavior::Reject),
        ]);

        let outcome = service.verify_step(&pan()).await.unwrap();
        assert!(!outcome.verified);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn all_providers_failing_keeps_last_error() {
        let service = service(&[
            FakeProvider::new("cashfree", Behavior::Fail),
            FakeProvider::new("surepass", Behavior::Fail),
        ]);

        let outcome = service.verify_step(&pan()).await.unwrap();
        assert!(!outcome.verified);
        assert_eq!(outcome.weight, 25);
        assert!(outcome.error.unwrap().contains("surepass down"));
    }

    #[tokio::test]
    async fn unsupported_step_is_an_error() {
        let service = service(&[FakeProvider::without(
            "surepass",
            Behavior::Verify,
            VerificationStep::Digilocker,
        )]);

        let err = service.verify_step(&digilocker()).await.unwrap_err();
        assert!(matches!(err, KycError::Unsupported("digilocker")));
    }

    #[tokio::test]
    async fn assess_aggregates_mixed_outcomes() {
        let digilocker_only = FakeProvider::without("cashfree", Behavior::Verify, VerificationStep::Pan);
        let pan_rejects = FakeProvider::without("surepass", Behavior::Reject, VerificationStep::Digilocker);
        let service = service(&[digilocker_only, pan_rejects]);

        let assessment = service
            .assess(VerificationLevel::Basic, &[digilocker(), pan()], now())
            .await
            .unwrap();
        assert_eq!(assessment.confidence, 55);
        assert_eq!(assessment.status, KycStatus::Pending);
        assert_eq!(assessment.steps.len(), 2);
        assert_eq!(assessment.assessed_at, now());
    }

    #[tokio::test]
    async fn assess_rejects_duplicate_steps() {
        let service = service(&[FakeProvider::new("cashfree", Behavior::Verify)]);
        let err = service
            .assess(VerificationLevel::Basic, &[pan(), pan()], now())
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn assess_with_no_steps_is_rejected() {
        let service = service(&[]);
        let assessment = service
            .assess(VerificationLevel::Enhanced, &[], now())
            .await
            .unwrap();
        assert_eq!(assessment.confidence, 0);
        assert_eq!(assessment.status, KycStatus::Rejected);
    }
}
