// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SurePass KYC API client.

use reqwest::Client;
use serde_json::{json, Value};

use super::confidence::VerificationStep;
use super::provider::{
    env_or_default, env_required, send_json, str_field, KycError, KycProvider, ProviderVerdict,
    StepInput, VENDOR_TIMEOUT,
};
use crate::BoxFuture;

const DEFAULT_BASE_URL: &str = "https://sandbox.surepass.io/api/v1";
const PROVIDER_NAME: &str = "surepass";

#[derive(Debug, Clone)]
pub struct SurePassClient {
    base_url: String,
    token: String,
    http: Client,
}

impl SurePassClient {
    pub fn is_configured() -> bool {
        env_required("SUREPASS_API_TOKEN").is_ok()
    }

    pub fn from_env() -> Result<Self, KycError> {
        Self::new(
            env_or_default("SUREPASS_BASE_URL", DEFAULT_BASE_URL),
            env_required("SUREPASS_API_TOKEN")?,
        )
    }

    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, KycError> {
        let http = Client::builder()
            .timeout(VENDOR_TIMEOUT)
            .build()
            .map_err(|e| KycError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    fn post(&self, path: &str, payload: Value) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(&payload)
    }
}

/// Map a SurePass response body to a verdict for `step`.
pub(crate) fn surepass_verdict(step: VerificationStep, body: &Value) -> ProviderVerdict {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    let flag = |pointer: &str| body.pointer(pointer).and_then(Value::as_bool).unwrap_or(false);

    let verified = success
        && match step {
            VerificationStep::Pan => str_field(body, "/data/pan_number").is_some_and(|p| !p.is_empty()),
            VerificationStep::Bank | VerificationStep::Upi => flag("/data/account_exists"),
            VerificationStep::FaceLiveness => flag("/data/live"),
            VerificationStep::Digilocker => false,
        };

    ProviderVerdict {
        verified,
        reference: str_field(body, "/data/client_id").map(str::to_string),
    }
}

impl KycProvider for SurePassClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// DigiLocker needs a consent session SurePass does not share with us.
    fn supports(&self, step: VerificationStep) -> bool {
        step != VerificationStep::Digilocker
    }

    fn verify<'a>(&'a self, input: &'a StepInput) -> BoxFuture<'a, Result<ProviderVerdict, KycError>> {
        Box::pin(async move {
            let request = match input {
                StepInput::Pan { pan, .. } => self.post("/pan/pan", json!({ "id_number": pan })),
                StepInput::Bank {
                    account_number,
                    ifsc,
                    ..
                } => self.post(
                    "/bank-verification/",
                    json!({ "id_number": account_number, "ifsc": ifsc, "ifsc_details": false }),
                ),
                StepInput::Upi { vpa, .. } => self.post(
                    "/bank-verification/upi-verification",
                    json!({ "upi_id": vpa }),
                ),
                StepInput::FaceLiveness { image_url } => {
                    self.post("/face/face-liveness", json!({ "image_url": image_url }))
                }
                StepInput::Digilocker { .. } => {
                    return Err(KycError::Unsupported(VerificationStep::Digilocker.as_str()))
                }
            };

            let body = send_json(PROVIDER_NAME, request).await?;
            Ok(surepass_verdict(input.step(), &body))
        })
    }
}
