// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::signature::SignatureError;
use crate::error::ApiError;
use crate::storage::StorageError;

/// Failures of the wallet authentication flow.
///
/// Client-facing variants are detected before any write, so returning one of
/// them leaves stored state untouched. The two 500-class variants are not.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Unknown user id on the detected-wallets endpoint.
    #[error("User not found")]
    UserNotFound,

    /// Unknown user id on verification; the client skipped the name step.
    #[error("User not found. Please enter your full name first.")]
    ProfileMissing,

    /// No pending (unexpired) challenge for the address.
    #[error("Nonce not found or expired. Request a new one.")]
    NonceNotFound,

    /// Signature bytes could not be parsed or recovered.
    #[error("Invalid signature format")]
    MalformedSignature(#[source] SignatureError),

    /// Signature recovers to a different address.
    #[error("Invalid signature")]
    SignatureMismatch,

    /// The reconciled list holds no entry for the proven wallet.
    #[error("connected wallet missing after reconciliation")]
    ConnectedWalletMissing,

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl AuthFlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFlowError::Validation(_) => "validation_error",
            AuthFlowError::UserNotFound | AuthFlowError::ProfileMissing => "user_not_found",
            AuthFlowError::NonceNotFound => "nonce_not_found",
            AuthFlowError::MalformedSignature(_) => "malformed_signature",
            AuthFlowError::SignatureMismatch => "signature_mismatch",
            AuthFlowError::ConnectedWalletMissing | AuthFlowError::Storage(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthFlowError::Validation(_)
            | AuthFlowError::NonceNotFound
            | AuthFlowError::MalformedSignature(_) => StatusCode::BAD_REQUEST,
            AuthFlowError::UserNotFound | AuthFlowError::ProfileMissing => StatusCode::NOT_FOUND,
            AuthFlowError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            AuthFlowError::ConnectedWalletMissing | AuthFlowError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SignatureError> for AuthFlowError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::Mismatch { .. } => AuthFlowError::SignatureMismatch,
            other => AuthFlowError::MalformedSignature(other),
        }
    }
}

impl From<AuthFlowError> for ApiError {
    fn from(e: AuthFlowError) -> Self {
        match e {
            AuthFlowError::Storage(inner) => ApiError::from(inner),
            AuthFlowError::ConnectedWalletMissing => {
                tracing::error!("Wallet verification left no connected entry");
                ApiError::internal()
            }
            other => {
                tracing::info!(error_code = other.error_code(), error = %other, "Wallet auth rejected");
                ApiError::new(other.status_code(), other.to_string())
            }
        }
    }
}

impl IntoResponse for AuthFlowError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
