// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nonce repository.
//!
//! Holds at most one pending challenge per address. A record older than the
//! configured TTL is treated as absent on read and is physically removed by
//! [`NonceRepository::purge_expired`], which the background sweeper calls.

use std::time::Duration;

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{decode, MarketDb, StorageResult, NONCES};
use crate::wallets::WalletAddress;

/// Default challenge validity window.
pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(300);

/// A pending single-use challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Nonce {
    pub address: WalletAddress,
    /// Full challenge text the wallet must sign.
    pub nonce: String,
    pub created_at: DateTime<Utc>,
}

impl Nonce {
    /// Whether the record is at least `ttl` old at `now`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.created_at).to_std() {
            Ok(age) => age >= ttl,
            // created_at in the future (clock skew)
            Err(_) => false,
        }
    }
}

/// Repository for pending challenges.
pub struct NonceRepository<'a> {
    db: &'a MarketDb,
    ttl: Duration,
}

impl<'a> NonceRepository<'a> {
    pub fn new(db: &'a MarketDb, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Store a challenge for `address`, replacing any pending one.
    pub fn upsert(&self, address: &WalletAddress, challenge: String) -> StorageResult<Nonce> {
        let nonce = Nonce {
            address: address.clone(),
            nonce: challenge,
            created_at: Utc::now(),
        };
        self.db.put(NONCES, address.as_str(), &nonce)?;
        Ok(nonce)
    }

    /// Find the pending challenge for `address`, ignoring expired records.
    pub fn find(&self, address: &WalletAddress) -> StorageResult<Option<Nonce>> {
        let nonce: Option<Nonce> = self.db.get(NONCES, address.as_str())?;
        Ok(nonce.filter(|n| !n.is_expired(self.ttl, Utc::now())))
    }

    /// Delete the record for `address` only if it still holds `challenge`.
    ///
    /// Returns whether a record was deleted. A challenge re-issued after the
    /// caller read it is left in place.
    pub fn consume(&self, address: &WalletAddress, challenge: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(NONCES)?;
            let current: Option<Nonce> = match table.get(address.as_str())? {
                Some(bytes) => Some(decode(bytes.value())?),
                None => None,
            };
            match current {
                Some(current) if current.nonce == challenge => {
                    table.remove(address.as_str())?;
                    true
                }
                _ => false,
            }
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Delete the record for `address` unconditionally.
    pub fn delete(&self, address: &WalletAddress) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(NONCES)?;
            table.remove(address.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove every record expired at `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(NONCES)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let stale = match decode::<Nonce>(value.value()) {
                    Ok(nonce) => nonce.is_expired(self.ttl, now),
                    // Unreadable records can never be consumed.
                    Err(_) => true,
                };
                if stale {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
