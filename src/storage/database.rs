// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized User
//! - `wallet_owners`: lowercase wallet address → user_id
//! - `nonces`: lowercase wallet address → serialized Nonce
//! - `objects`: object_id → serialized Object3D
//! - `purchases`: purchase_id → serialized Purchase
//!
//! Every document is stored as JSON bytes so records stay readable with
//! generic tooling and tolerate added optional fields.

use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

/// A table of JSON documents keyed by string id.
pub(crate) type DocumentTable = TableDefinition<'static, &'static str, &'static [u8]>;

pub(crate) const USERS: DocumentTable = TableDefinition::new("users");

/// Index: lowercase wallet address → user_id.
pub(crate) const WALLET_OWNERS: TableDefinition<&str, &str> = TableDefinition::new("wallet_owners");

pub(crate) const NONCES: DocumentTable = TableDefinition::new("nonces");

pub(crate) const OBJECTS: DocumentTable = TableDefinition::new("objects");

pub(crate) const PURCHASES: DocumentTable = TableDefinition::new("purchases");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// MarketDb
// =============================================================================

/// Embedded ACID document store for the marketplace.
pub struct MarketDb {
    db: Database,
}

impl MarketDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(WALLET_OWNERS)?;
            let _ = write_txn.open_table(NONCES)?;
            let _ = write_txn.open_table(OBJECTS)?;
            let _ = write_txn.open_table(PURCHASES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Verify that the database answers a read transaction.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        table.len()?;
        Ok(())
    }

    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // =========================================================================
    // Address ↔ User mapping
    // =========================================================================

    /// Look up which user_id holds a given wallet address.
    pub(crate) fn wallet_owner(&self, address: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_OWNERS)?;
        match table.get(address)? {
            Some(v) => Ok(Some(v.value().to_string())),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Generic document operations
    // =========================================================================

    /// Read one document.
    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        table: DocumentTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one document.
    pub(crate) fn put<T: Serialize>(
        &self,
        table: DocumentTable,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let json = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read every document in a table.
    ///
    /// Documents that fail to deserialize are skipped with a warning.
    pub(crate) fn scan<T: DeserializeOwned>(&self, table: DocumentTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        let mut documents = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match serde_json::from_slice(value.value()) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    tracing::warn!(key = %key.value(), error = %e, "Skipping unreadable document");
                }
            }
        }
        Ok(documents)
    }

    /// Number of documents in a table.
    pub(crate) fn count(&self, table: DocumentTable) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        Ok(table.len()?)
    }

    /// Read-modify-write one document inside a single write transaction.
    ///
    /// Returns `None` without writing when the document does not exist.
    pub(crate) fn update<T, R, F>(
        &self,
        table: DocumentTable,
        key: &str,
        f: F,
    ) -> StorageResult<Option<(T, R)>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> R,
    {
        let write_txn = self.db.begin_write()?;
        let result = {
            let mut table = write_txn.open_table(table)?;
            let existing_bytes = match table.get(key)? {
                Some(existing) => existing.value().to_vec(),
                None => return Ok(None),
            };

            let mut document: T = serde_json::from_slice(&existing_bytes)?;
            let output = f(&mut document);
            let json = serde_json::to_vec(&document)?;
            table.insert(key, json.as_slice())?;
            (document, output)
        };
        write_txn.commit()?;
        Ok(Some(result))
    }
}

/// Deserialize a document read inside a write transaction.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// Tests
// =============================================================================
