// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! A user document embeds the full wallet list. Every save rewrites the list
//! as one field and refreshes the `wallet_owners` index in the same write
//! transaction, so lookups by address never see a half-applied update.
//! Concurrent updates to one user are last-writer-wins.

use std::collections::HashSet;

use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{decode, MarketDb, StorageResult, USERS, WALLET_OWNERS};
use crate::wallets::{Wallet, WalletAddress};

/// Identity record with its embedded wallet list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier (UUID).
    pub id: String,
    /// Full display name.
    pub fullname: String,
    /// Ordered wallet list; order drives first-match semantics.
    #[serde(default)]
    pub wallets: Vec<Wallet>,
}

impl User {
    fn addresses(&self) -> HashSet<&WalletAddress> {
        self.wallets.iter().filter_map(|w| w.address.as_ref()).collect()
    }
}

/// Repository for user documents.
pub struct UserRepository<'a> {
    db: &'a MarketDb,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a MarketDb) -> Self {
        Self { db }
    }

    /// Create a user with a display name and no wallets.
    pub fn create(&self, fullname: &str) -> StorageResult<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            fullname: fullname.to_string(),
            wallets: Vec::new(),
        };
        self.save(&user)?;
        Ok(user)
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<Option<User>> {
        self.db.get(USERS, user_id)
    }

    /// Find the user holding a connected wallet with this address.
    pub fn find_by_wallet_address(&self, address: &WalletAddress) -> StorageResult<Option<User>> {
        let owner_id = self.db.wallet_owner(address.as_str())?;

        let Some(owner_id) = owner_id else {
            return Ok(None);
        };

        // The index is rewritten on every save; double-check against the document.
        Ok(self
            .get(&owner_id)?
            .filter(|user| user.addresses().contains(address)))
    }

    /// Insert or replace a user document.
    pub fn save(&self, user: &User) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_user(&write_txn, user)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Read-modify-write a user in one transaction.
    ///
    /// Returns `None` when the user does not exist.
    pub fn update<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut User) -> R,
    ) -> StorageResult<Option<(User, R)>> {
        let write_txn = self.db.begin_write()?;
        let existing = {
            let users = write_txn.open_table(USERS)?;
            let bytes = users.get(user_id)?.map(|v| v.value().to_vec());
            bytes
        };

        let Some(bytes) = existing else {
            write_txn.abort()?;
            return Ok(None);
        };

        let mut user: User = decode(&bytes)?;
        let output = f(&mut user);
        write_user(&write_txn, &user)?;
        write_txn.commit()?;
        Ok(Some((user, output)))
    }

    /// Total number of users.
    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(USERS)
    }
}

/// Write the document and bring the address index in line with it.
fn write_user(write_txn: &WriteTransaction, user: &User) -> StorageResult<()> {
    let json = serde_json::to_vec(user)?;
    let mut users = write_txn.open_table(USERS)?;
    let mut owners = write_txn.open_table(WALLET_OWNERS)?;

    let previous: Option<User> = match users.get(user.id.as_str())? {
        Some(bytes) => Some(decode(bytes.value())?),
        None => None,
    };

    let current = user.addresses();
    if let Some(previous) = previous {
        for address in previous.addresses() {
            if current.contains(address) {
                continue;
            }
            let held_by_user = owners
                .get(address.as_str())?
                .is_some_and(|owner| owner.value() == user.id);
            if held_by_user {
                owners.remove(address.as_str())?;
            }
        }
    }

    for address in current {
        owners.insert(address.as_str(), user.id.as_str())?;
    }
    users.insert(user.id.as_str(), json.as_slice())?;
    Ok(())
}
