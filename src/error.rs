// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::VaultClientError;
use crate::kyc::KycError;
use crate::metrics::MetricsError;
use crate::storage::DbError;
use crate::yield_model::YieldModelError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Stable machine-readable code, when the caller needs to branch on it
    pub code: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }
        let body = Json(ErrorBody {
            error: self.message,
            code: self.code,
        });
        (self.status, body).into_response()
    }
}

impl From<YieldModelError> for ApiError {
    fn from(err: YieldModelError) -> Self {
        match err {
            YieldModelError::InvalidLockPeriod(_) => {
                ApiError::bad_request(err.to_string()).with_code("invalid_lock_period")
            }
            YieldModelError::InvalidApy(_) => {
                ApiError::bad_request(err.to_string()).with_code("invalid_apy")
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::AlreadyExists(id) => ApiError::conflict(format!("Record {id} already exists")),
            other => ApiError::internal(format!("Storage error: {other}")),
        }
    }
}

impl From<KycError> for ApiError {
    fn from(err: KycError) -> Self {
        match err {
            KycError::InvalidInput(_) => ApiError::bad_request(err.to_string()),
            KycError::Unsupported(_) | KycError::MissingConfig(_) => {
                ApiError::service_unavailable(err.to_string())
            }
            KycError::Request(_) | KycError::InvalidResponse(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
        }
    }
}

impl From<VaultClientError> for ApiError {
    fn from(err: VaultClientError) -> Self {
        match err {
            VaultClientError::InvalidAddress(_) | VaultClientError::Overflow(_) => {
                ApiError::bad_request(err.to_string())
            }
            other => ApiError::new(StatusCode::BAD_GATEWAY, other.to_string()),
        }
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::Unavailable { .. } => ApiError::service_unavailable(err.to_string()),
            MetricsError::Storage(db) => db.into(),
        }
    }
}
