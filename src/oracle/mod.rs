// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Net-Worth Oracle
//!
//! Aggregate USD valuation of an address across a fixed set of EVM chains,
//! obtained from an external indexing service.
//!
//! Oracle failures never fail a request. Callers go through
//! [`observed_net_worth`], which logs the failure and yields `None` so the
//! caller keeps its fallback balance.

pub mod moralis;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::wallets::WalletAddress;

pub use moralis::MoralisClient;

/// Chains included in every net-worth query.
pub const NET_WORTH_CHAINS: [&str; 6] = ["eth", "polygon", "bsc", "arbitrum", "optimism", "base"];

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("invalid oracle URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("oracle returned HTTP {0}")]
    Status(u16),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Source of net-worth valuations.
#[async_trait]
pub trait NetWorthOracle: Send + Sync {
    /// Total USD valuation of `address` as a decimal string.
    async fn net_worth_usd(&self, address: &WalletAddress) -> Result<String, OracleError>;
}

/// Query the oracle, absorbing every failure into `None`.
///
/// Returns `None` without a request when no oracle is configured.
pub async fn observed_net_worth(
    oracle: Option<&dyn NetWorthOracle>,
    address: &WalletAddress,
) -> Option<String> {
    let oracle = oracle?;
    match oracle.net_worth_usd(address).await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(address = %address, error = %e, "Net-worth lookup failed, keeping fallback balance");
            None
        }
    }
}
