// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::oracle::NetWorthOracle;
use crate::storage::{
    MarketDb, NonceRepository, ObjectRepository, PurchaseRepository, UserRepository,
};

/// Shared handler state. All mutable state lives in the database.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MarketDb>,
    /// Net-worth oracle; `None` when no API key is configured.
    pub oracle: Option<Arc<dyn NetWorthOracle>>,
    pub nonce_ttl: Duration,
}

impl AppState {
    pub fn new(
        db: Arc<MarketDb>,
        oracle: Option<Arc<dyn NetWorthOracle>>,
        nonce_ttl: Duration,
    ) -> Self {
        Self {
            db,
            oracle,
            nonce_ttl,
        }
    }

    pub fn oracle(&self) -> Option<&dyn NetWorthOracle> {
        self.oracle.as_deref()
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.db)
    }

    pub fn nonces(&self) -> NonceRepository<'_> {
        NonceRepository::new(&self.db, self.nonce_ttl)
    }

    pub fn objects(&self) -> ObjectRepository<'_> {
        ObjectRepository::new(&self.db)
    }

    pub fn purchases(&self) -> PurchaseRepository<'_> {
        PurchaseRepository::new(&self.db)
    }
}
