// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Model and Reconciliation
//!
//! A user's wallets are an ordered list embedded in the user document. An
//! entry without an address is *detected*: the client saw a wallet provider
//! but ownership is unproven. An entry with an address is *connected*: the
//! user signed a challenge with that address.
//!
//! ## List Invariants
//!
//! - At most one entry per address.
//! - At most one detected entry per name.
//! - A detected entry is upgraded in place when its wallet is connected.
//!
//! All list mutation lives in [`reconcile`] as pure functions over
//! `Vec<Wallet>`; persistence wraps them in a single read-modify-write.

pub mod address;
pub mod reconcile;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use address::{InvalidAddress, WalletAddress};
pub use reconcile::{
    reconcile, register_detected, ConnectedWallet, Reconciliation, ReconcileOutcome,
};

/// Balance assigned when none has been observed.
pub const DEFAULT_BALANCE: &str = "0";

/// Name used when a wallet is connected without a provider name.
pub const UNKNOWN_WALLET_NAME: &str = "unknown";

fn default_balance() -> String {
    DEFAULT_BALANCE.to_string()
}

/// A wallet entry embedded in a user record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Wallet {
    /// Wallet provider identifier (e.g. "metamask").
    pub name: String,
    /// Lowercase address, or null while the wallet is only detected.
    #[schema(value_type = Option<String>)]
    pub address: Option<WalletAddress>,
    /// USD valuation as a decimal string.
    #[serde(default = "default_balance")]
    pub balance: String,
}

impl Wallet {
    /// A detected placeholder for a provider observed client-side.
    pub fn detected(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            balance: default_balance(),
        }
    }

    /// A connected entry for a proven address.
    pub fn connected(
        name: impl Into<String>,
        address: WalletAddress,
        balance: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: Some(address),
            balance: balance.unwrap_or_else(default_balance),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn is_detected(&self) -> bool {
        self.address.is_none()
    }
}
