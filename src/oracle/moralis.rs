// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Moralis wallet net-worth client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{NetWorthOracle, OracleError, NET_WORTH_CHAINS};
use crate::config::OracleConfig;
use crate::wallets::{WalletAddress, DEFAULT_BALANCE};

const API_KEY_HEADER: &str = "X-API-Key";

pub struct MoralisClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        // Reject unusable base URLs at startup rather than per request.
        Url::parse(&base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        Self::new(&config.base_url, &config.api_key, config.timeout)
    }

    fn net_worth_url(&self, address: &WalletAddress) -> Result<Url, OracleError> {
        let mut url = Url::parse(&format!(
            "{}/wallets/{}/net-worth",
            self.base_url,
            address.as_str()
        ))?;
        {
            let mut query = url.query_pairs_mut();
            for chain in NET_WORTH_CHAINS {
                query.append_pair("chains", chain);
            }
        }
        Ok(url)
    }
}

/// Extract `total_networth_usd`. Missing, null, or empty values read as zero.
fn total_net_worth(body: &Value) -> Result<String, OracleError> {
    match body.get("total_networth_usd") {
        None | Some(Value::Null) => Ok(DEFAULT_BALANCE.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(DEFAULT_BALANCE.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(OracleError::Decode(format!(
            "total_networth_usd has unexpected type: {other}"
        ))),
    }
}

#[async_trait]
impl NetWorthOracle for MoralisClient {
    async fn net_worth_usd(&self, address: &WalletAddress) -> Result<String, OracleError> {
        let url = self.net_worth_url(address)?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;
        let total = total_net_worth(&body)?;

        tracing::debug!(address = %address, total_usd = %total, "Fetched wallet net worth");
        Ok(total)
    }
}
