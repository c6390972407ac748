// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC vendor abstraction and per-step inputs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::confidence::VerificationStep;
use crate::BoxFuture;

/// HTTP timeout for vendor calls.
pub(crate) const VENDOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Input for one verification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepInput {
    /// DigiLocker consent flow started by the client.
    Digilocker { verification_id: String },
    /// PAN card number.
    Pan {
        pan: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Selfie liveness check.
    FaceLiveness { image_url: String },
    /// Bank account penny-less check.
    Bank {
        account_number: String,
        ifsc: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// UPI handle check.
    Upi {
        vpa: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl StepInput {
    pub fn step(&self) -> VerificationStep {
        match self {
            StepInput::Digilocker { .. } => VerificationStep::Digilocker,
            StepInput::Pan { .. } => VerificationStep::Pan,
            StepInput::FaceLiveness { .. } => VerificationStep::FaceLiveness,
            StepInput::Bank { .. } => VerificationStep::Bank,
            StepInput::Upi { .. } => VerificationStep::Upi,
        }
    }

    /// Shape checks done before any vendor is called.
    pub fn validate(&self) -> Result<(), KycError> {
        match self {
            StepInput::Digilocker { verification_id } => {
                non_empty("verification_id", verification_id)
            }
            StepInput::Pan { pan, .. } => {
                if is_valid_pan(pan) {
                    Ok(())
                } else {
                    Err(KycError::InvalidInput("PAN must match AAAAA9999A".to_string()))
                }
            }
            StepInput::FaceLiveness { image_url } => url::Url::parse(image_url)
                .map(|_| ())
                .map_err(|e| KycError::InvalidInput(format!("image_url: {e}"))),
            StepInput::Bank {
                account_number,
                ifsc,
                ..
            } => {
                if account_number.len() < 6
                    || account_number.len() > 20
                    || !account_number.chars().all(|c| c.is_ascii_digit())
                {
                    return Err(KycError::InvalidInput(
                        "account_number must be 6-20 digits".to_string(),
                    ));
                }
                if !is_valid_ifsc(ifsc) {
                    return Err(KycError::InvalidInput("IFSC must match AAAA0XXXXXX".to_string()));
                }
                Ok(())
            }
            StepInput::Upi { vpa, .. } => match vpa.split_once('@') {
                Some((handle, bank)) if !handle.is_empty() && !bank.is_empty() => Ok(()),
                _ => Err(KycError::InvalidInput("vpa must look like name@bank".to_string())),
            },
        }
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), KycError> {
    if value.trim().is_empty() {
        Err(KycError::InvalidInput(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn is_valid_pan(pan: &str) -> bool {
    let bytes = pan.as_bytes();
    bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase()
}

fn is_valid_ifsc(ifsc: &str) -> bool {
    let bytes = ifsc.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..].iter().all(u8::is_ascii_alphanumeric)
}

/// Normalized vendor answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderVerdict {
    pub verified: bool,
    /// Vendor reference for audit, when returned.
    pub reference: Option<String>,
}

/// A KYC verification vendor.
pub trait KycProvider: Send + Sync {
    /// Stable identifier recorded on step outcomes.
    fn name(&self) -> &'static str;

    fn supports(&self, step: VerificationStep) -> bool;

    fn verify<'a>(&'a self, input: &'a StepInput) -> BoxFuture<'a, Result<ProviderVerdict, KycError>>;
}

/// Read a string field from a vendor response, if present.
pub(crate) fn str_field<'v>(body: &'v Value, pointer: &str) -> Option<&'v str> {
    body.pointer(pointer).and_then(Value::as_str)
}

/// Send a vendor request and return the JSON body of a 2xx response.
pub(crate) async fn send_json(
    vendor: &str,
    request: reqwest::RequestBuilder,
) -> Result<Value, KycError> {
    let response = request
        .send()
        .await
        .map_err(|e| KycError::Request(format!("{vendor}: {e}")))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| KycError::InvalidResponse(format!("{vendor}: {e}")))?;

    if !status.is_success() {
        let message = str_field(&body, "/message").unwrap_or("no message");
        return Err(KycError::Request(format!("{vendor}: HTTP {status}: {message}")));
    }

    Ok(body)
}

pub(crate) fn env_required(key: &str) -> Result<String, KycError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| KycError::MissingConfig(key.to_string()))
}

pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum KycError {
    #[error("KYC provider configuration missing: {0}")]
    MissingConfig(String),

    #[error("KYC request failed: {0}")]
    Request(String),

    #[error("KYC provider response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Invalid KYC input: {0}")]
    InvalidInput(String),

    #[error("No configured provider supports step `{0}`")]
    Unsupported(&'static str),
}
