// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. JSON field names are
//! camelCase, matching the marketplace frontend.
//!
//! Request fields that the handlers validate themselves are `Option`s, so a
//! missing field produces the endpoint's own 400 message rather than a
//! generic deserialization error.
//!
//! ## Model Categories
//!
//! - **Auth**: name registration, wallet detection, nonce and verification
//! - **Users**: wallet-addressed profiles
//! - **Objects / Purchases**: catalog listings and their sales
//! - **Stats**: platform totals

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::storage::{Object3D, Purchase, User};
use crate::wallets::Wallet;

/// Read a JSON string or number as trimmed text; anything else is absent.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveFullnameRequest {
    pub fullname: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullnameResponse {
    pub user_id: String,
    pub fullname: String,
}

/// Wallet providers observed by the client-side probe.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedWalletsRequest {
    pub user_id: Option<String>,
    /// Array of provider names, e.g. `["metamask", "rabby"]`.
    #[schema(value_type = Option<Vec<String>>)]
    pub detected_wallets: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetectedWalletsResponse {
    pub success: bool,
    pub wallets: Vec<Wallet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NonceResponse {
    /// Challenge text to sign with the wallet.
    pub nonce: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureRequest {
    pub address: Option<String>,
    /// 65-byte hex signature over the issued challenge.
    pub signature: Option<String>,
    /// Provider name, e.g. `metamask`.
    pub wallet_type: Option<String>,
    /// Client-observed balance, used when the oracle has no answer.
    #[schema(value_type = Option<String>)]
    pub balance: Option<Value>,
    pub user_id: Option<String>,
}

/// User as returned by auth and profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub fullname: String,
    pub wallets: Vec<Wallet>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            wallets: user.wallets,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub user: UserSummary,
    pub connected_wallet: Wallet,
    /// `<address>_<unix millis>` marker; not a credential.
    pub token: String,
}

// =============================================================================
// User Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub fullname: String,
    pub wallets: Vec<Wallet>,
    /// Listings created by the requested address.
    pub objects: Vec<Object3D>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub fullname: Option<String>,
}

// =============================================================================
// Object Models
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObjectListQuery {
    /// Category name, or `all`.
    pub category: Option<String>,
    /// `newest` (default), `price-low`, `price-high` or `popular`.
    pub sort: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateObjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Value>,
    pub category: Option<String>,
    pub creator_address: Option<String>,
    /// URL of the already-hosted model file.
    pub model_url: Option<String>,
    /// URL of the already-hosted thumbnail image.
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorSummary {
    pub fullname: String,
    pub wallets: Vec<Wallet>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ObjectDetail {
    #[serde(flatten)]
    pub object: Object3D,
    pub creator: Option<CreatorSummary>,
}

// =============================================================================
// Purchase Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub object_id: Option<String>,
    pub buyer_address: Option<String>,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseWithObject {
    #[serde(flatten)]
    pub purchase: Purchase,
    /// `null` when the listing no longer exists.
    pub object: Option<Object3D>,
}

// =============================================================================
// Stats Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_objects: u64,
    pub total_users: u64,
    pub total_sales: u64,
    pub total_volume: f64,
}
