// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lowercase-normalized EVM wallet address.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a string is not a well-formed EVM address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wallet address: {0}")]
pub struct InvalidAddress(pub String);

/// Ethereum-compatible wallet address.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes). The inner
/// string is always lowercase, so two `WalletAddress` values compare equal
/// exactly when the addresses match case-insensitively.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// assert_eq!(addr.as_str(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and normalize an address. Checksums are not enforced.
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let trimmed = raw.trim();
        if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
            return Err(InvalidAddress(trimmed.to_string()));
        }
        let address =
            Address::from_str(trimmed).map_err(|_| InvalidAddress(trimmed.to_string()))?;
        Ok(Self::from(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Address> for WalletAddress {
    fn from(address: Address) -> Self {
        WalletAddress(alloy::hex::encode_prefixed(address))
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}
