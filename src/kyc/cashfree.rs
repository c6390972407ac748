// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cashfree Secure ID verification client.

use reqwest::Client;
use serde_json::{json, Value};

use super::confidence::VerificationStep;
use super::provider::{
    env_or_default, env_required, send_json, str_field, KycError, KycProvider, ProviderVerdict,
    StepInput, VENDOR_TIMEOUT,
};
use crate::BoxFuture;

const DEFAULT_BASE_URL: &str = "https://sandbox.cashfree.com/verification";
const API_VERSION: &str = "2023-12-18";
const PROVIDER_NAME: &str = "cashfree";

#[derive(Debug, Clone)]
pub struct CashfreeClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    http: Client,
}

impl CashfreeClient {
    pub fn is_configured() -> bool {
        env_required("CASHFREE_CLIENT_ID").is_ok() && env_required("CASHFREE_CLIENT_SECRET").is_ok()
    }

    pub fn from_env() -> Result<Self, KycError> {
        Self::new(
            env_or_default("CASHFREE_BASE_URL", DEFAULT_BASE_URL),
            env_required("CASHFREE_CLIENT_ID")?,
            env_required("CASHFREE_CLIENT_SECRET")?,
        )
    }

    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, KycError> {
        let http = Client::builder()
            .timeout(VENDOR_TIMEOUT)
            .build()
            .map_err(|e| KycError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("x-client-id", &self.client_id)
            .header("x-client-secret", &self.client_secret)
            .header("x-api-version", API_VERSION)
    }

    async fn call(&self, input: &StepInput) -> Result<Value, KycError> {
        let request = match input {
            StepInput::Digilocker { verification_id } => self
                .request(reqwest::Method::GET, "/digilocker")
                .query(&[("verification_id", verification_id)]),
            StepInput::Pan { pan, name } => self
                .request(reqwest::Method::POST, "/pan")
                .json(&json!({ "pan": pan, "name": name })),
            StepInput::FaceLiveness { image_url } => self
                .request(reqwest::Method::POST, "/liveness")
                .json(&json!({ "image_url": image_url })),
            StepInput::Bank {
                account_number,
                ifsc,
                name,
            } => self
                .request(reqwest::Method::POST, "/bank-account/sync")
                .json(&json!({ "bank_account": account_number, "ifsc": ifsc, "name": name })),
            StepInput::Upi { vpa, name } => self
                .request(reqwest::Method::POST, "/upi")
                .json(&json!({ "vpa": vpa, "name": name })),
        };

        send_json(PROVIDER_NAME, request).await
    }
}

/// Map a Cashfree response body to a verdict for `step`.
pub(crate) fn cashfree_verdict(step: VerificationStep, body: &Value) -> ProviderVerdict {
    let verified = match step {
        VerificationStep::Digilocker => str_field(body, "/status") == Some("AUTHENTICATED"),
        VerificationStep::Pan => body.get("valid").and_then(Value::as_bool).unwrap_or(false),
        VerificationStep::FaceLiveness => {
            body.get("liveness").and_then(Value::as_bool).unwrap_or(false)
        }
        VerificationStep::Bank | VerificationStep::Upi => {
            str_field(body, "/account_status") == Some("VALID")
        }
    };

    let reference = body
        .get("reference_id")
        .map(|r| match r {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    ProviderVerdict {
        verified,
        reference,
    }
}

impl KycProvider for CashfreeClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports(&self, _step: VerificationStep) -> bool {
        true
    }

    fn verify<'a>(&'a self, input: &'a StepInput) -> BoxFuture<'a, Result<ProviderVerdict, KycError>> {
        Box::pin(async move {
            let body = self.call(input).await?;
            Ok(cashfree_verdict(input.step(), &body))
        })
    }
}
